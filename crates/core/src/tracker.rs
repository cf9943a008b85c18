use core::fmt;

use tracing::{error, info};

use attestor_types::{BlockHash, ExecutionStatus, FinalityStatus, InvokeTransaction, TxHash};

use crate::error::{AttestError, SignerError};
use crate::signer::Signer;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AttestStatus {
    /// Nothing submitted yet for this window.
    #[default]
    Idle,
    /// Submitted, not final yet.
    Ongoing,
    Successful,
    /// The last attempt failed, the next `DoAttest` retries.
    Failed,
}

impl fmt::Display for AttestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttestStatus::Idle => write!(f, "idle"),
            AttestStatus::Ongoing => write!(f, "ongoing"),
            AttestStatus::Successful => write!(f, "successful"),
            AttestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The attestation transaction of the current window, kept signed so it can
/// be sent as soon as the window opens.
#[derive(Clone, Debug, Default)]
pub struct AttestTransaction {
    txn: Option<InvokeTransaction>,
    valid: bool,
}

impl AttestTransaction {
    /// Whether a built and signed transaction is ready to be invoked.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn transaction(&self) -> Option<&InvokeTransaction> {
        self.txn.as_ref()
    }

    pub async fn build<S: Signer>(
        &mut self,
        signer: &S,
        block_hash: &BlockHash,
    ) -> Result<(), AttestError> {
        self.valid = false;

        let mut txn = signer
            .build_attest_transaction(block_hash)
            .await
            .map_err(AttestError::Build)?;

        signer
            .sign_transaction(&mut txn)
            .await
            .map_err(AttestError::Sign)?;

        self.txn = Some(txn);
        self.valid = true;

        Ok(())
    }

    /// Estimates the fee, re-signs with the resulting bounds and submits.
    /// The transaction must be rebuilt or refreshed before the next attempt.
    pub async fn invoke<S: Signer>(&mut self, signer: &S) -> Result<TxHash, AttestError> {
        let txn = match self.txn.as_mut() {
            Some(txn) if self.valid => txn,
            _ => return Err(AttestError::NotBuilt),
        };
        self.valid = false;

        let estimate = signer
            .estimate_fee(txn)
            .await
            .map_err(AttestError::EstimateFee)?;

        txn.resource_bounds = estimate.to_resource_bounds(signer.fee_multiplier());
        txn.version = InvokeTransaction::VERSION;

        signer
            .sign_transaction(txn)
            .await
            .map_err(AttestError::Sign)?;

        signer
            .invoke_transaction(txn)
            .await
            .map_err(AttestError::Invoke)
    }

    /// Re-signs the transaction if the account nonce moved since it was built.
    pub async fn update_nonce<S: Signer>(&mut self, signer: &S) -> Result<(), AttestError> {
        let txn = match self.txn.as_mut() {
            Some(txn) if self.valid => txn,
            _ => return Err(AttestError::NotBuilt),
        };

        let nonce = signer.nonce().await.map_err(AttestError::Nonce)?;
        if txn.nonce != nonce {
            txn.nonce = nonce;
            signer
                .sign_transaction(txn)
                .await
                .map_err(AttestError::Sign)?;
        }

        Ok(())
    }
}

/// Attestation state of one window. Replaced by a fresh tracker at the end
/// of every window, or when events start naming another target block.
#[derive(Clone, Debug, Default)]
pub struct AttestTracker {
    /// Block the transaction attests to, zero until the first event of the window.
    pub target: BlockHash,
    pub transaction: AttestTransaction,
    pub hash: TxHash,
    pub status: AttestStatus,
}

impl AttestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls the status of the submitted transaction.
    pub async fn update_status<S: Signer>(&mut self, signer: &S) {
        let status = track_attest(signer, &self.hash).await;
        self.set_status(status);
    }

    /// A failed transaction forgets its hash. A tracker never goes back to idle.
    pub fn set_status(&mut self, status: AttestStatus) {
        debug_assert_ne!(status, AttestStatus::Idle, "tracker status cannot go back to idle");

        self.status = status;
        if status == AttestStatus::Failed {
            self.hash = TxHash::ZERO;
        }
    }
}

/// Maps the chain's view of transaction `hash` to an attestation status.
pub async fn track_attest<S: Signer>(signer: &S, hash: &TxHash) -> AttestStatus {
    let status = match signer.transaction_status(hash).await {
        Ok(status) => status,
        Err(SignerError::TransactionNotFound) => {
            info!(transaction_hash = %hash, "Attest transaction status was not found. Will wait.");
            return AttestStatus::Ongoing;
        }
        Err(err) => {
            error!(transaction_hash = %hash, %err, "Attest transaction FAILED. Will retry.");
            return AttestStatus::Failed;
        }
    };

    if status.execution_status == Some(ExecutionStatus::Reverted) {
        error!(
            transaction_hash = %hash,
            failure_reason = status.failure_reason.as_deref().unwrap_or_default(),
            "Attest transaction REVERTED. Will retry."
        );
        return AttestStatus::Failed;
    }

    match status.finality_status {
        FinalityStatus::Rejected => {
            error!(transaction_hash = %hash, "Attest transaction REJECTED. Will retry.");
            AttestStatus::Failed
        }
        FinalityStatus::Received | FinalityStatus::Candidate | FinalityStatus::PreConfirmed => {
            info!(
                transaction_hash = %hash,
                finality_status = %status.finality_status,
                "Attest transaction not final yet. Will wait."
            );
            AttestStatus::Ongoing
        }
        FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1 => {
            info!(
                transaction_hash = %hash,
                finality_status = %status.finality_status,
                execution_status = ?status.execution_status,
                "Attest transaction SUCCESSFUL"
            );
            AttestStatus::Successful
        }
    }
}
