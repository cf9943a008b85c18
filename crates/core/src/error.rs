use attestor_types::{EpochInfo, Felt, FeltError, Retries};

use crate::watcher::SubscriptionError;

/// Failure reported by a [`crate::Signer`].
///
/// Chain-specific failures that the attestor reacts to get their own variant,
/// everything else is carried as text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The attestation contract already holds an attestation for this epoch.
    #[error("attestation already done for the current epoch")]
    AttestationAlreadyDone,

    #[error("transaction hash not found")]
    TransactionNotFound,

    #[error("block not found")]
    BlockNotFound,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error when calling entrypoint `{entrypoint}`: {source}")]
    EntrypointCall {
        entrypoint: &'static str,
        source: SignerError,
    },

    #[error("invalid response from entrypoint {entrypoint}. Response: [{response}]")]
    EntrypointResponse {
        entrypoint: &'static str,
        response: String,
    },

    #[error("epoch length {epoch_len} must be greater than the attestation window {attest_window}")]
    InvalidAttestWindow { epoch_len: u64, attest_window: u64 },

    #[error("failed to fetch epoch info after {retries} retries. Epoch id: {epoch_id}. Error: {source}")]
    EpochFetch {
        retries: Retries,
        epoch_id: String,
        source: Box<Error>,
    },

    #[error("wrong epoch switch after {retries} retries from epoch:\n{prev}\nTo epoch:\n{next}")]
    WrongEpochSwitch {
        retries: Retries,
        prev: EpochInfo,
        next: EpochInfo,
    },

    #[error("cannot subscribe to block headers after {retries} retries: {source}")]
    Subscribe {
        retries: Retries,
        source: SubscriptionError,
    },

    #[error("attestation dispatcher stopped")]
    DispatcherClosed,

    #[error(transparent)]
    Felt(#[from] FeltError),
}

impl Error {
    pub(crate) fn entrypoint_response(entrypoint: &'static str, response: &[Felt]) -> Self {
        let response = response
            .iter()
            .map(attestor_types::felt::to_hex)
            .collect::<Vec<_>>()
            .join(", ");

        Self::EntrypointResponse {
            entrypoint,
            response,
        }
    }
}

/// Why an attempt to build or submit the attestation transaction failed.
#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    #[error("invoking attest transaction before building it")]
    NotBuilt,

    #[error("signer failed building the transaction: {0}")]
    Build(SignerError),

    #[error("signer failed to sign the transaction: {0}")]
    Sign(SignerError),

    #[error("signer failed to get the nonce: {0}")]
    Nonce(SignerError),

    #[error("signer failed to estimate fee: {0}")]
    EstimateFee(SignerError),

    #[error("signer failed to invoke the transaction: {0}")]
    Invoke(SignerError),
}

impl AttestError {
    pub fn signer_error(&self) -> Option<&SignerError> {
        match self {
            AttestError::NotBuilt => None,
            AttestError::Build(e)
            | AttestError::Sign(e)
            | AttestError::Nonce(e)
            | AttestError::EstimateFee(e)
            | AttestError::Invoke(e) => Some(e),
        }
    }

    /// Fee estimation executes the call, so the contract can refuse a
    /// duplicate attestation there as well as at submission.
    pub fn is_already_done(&self) -> bool {
        matches!(self.signer_error(), Some(SignerError::AttestationAlreadyDone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use attestor_types::{Address, BlockNumber};

    #[test]
    fn entrypoint_messages() {
        let err = Error::EntrypointCall {
            entrypoint: "attestation_window",
            source: SignerError::Transport("connection refused".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error when calling entrypoint `attestation_window`: transport error: connection refused"
        );

        let err = Error::entrypoint_response("attestation_window", &[Felt::ONE, Felt::TWO]);
        assert_eq!(
            err.to_string(),
            "invalid response from entrypoint attestation_window. Response: [0x1, 0x2]"
        );
    }

    #[test]
    fn wrong_epoch_switch_names_both_epochs() {
        let epoch = |epoch_id, starting_block| EpochInfo {
            staker_address: Address::ZERO,
            stake: 1,
            epoch_len: 40,
            epoch_id,
            starting_block: BlockNumber::new(starting_block),
        };

        let err = Error::WrongEpochSwitch {
            retries: Retries::new(10),
            prev: epoch(1516, 639_270),
            next: epoch(1517, 639_311),
        };

        let message = err.to_string();
        assert!(message.starts_with("wrong epoch switch after 10 retries from epoch:\n"));
        assert!(message.contains("\"epoch_id\":1516"));
        assert!(message.contains("\"current_epoch_starting_block\":639311"));
    }

    #[test]
    fn already_done_is_detected_at_any_step() {
        assert!(AttestError::EstimateFee(SignerError::AttestationAlreadyDone).is_already_done());
        assert!(AttestError::Invoke(SignerError::AttestationAlreadyDone).is_already_done());
        assert!(!AttestError::Invoke(SignerError::TransactionNotFound).is_already_done());
        assert!(!AttestError::NotBuilt.is_already_done());
    }
}
