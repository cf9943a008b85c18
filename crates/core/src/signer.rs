use async_trait::async_trait;

use attestor_types::constants::FEE_ESTIMATION_MULTIPLIER;
use attestor_types::{
    Address, BlockHash, BlockId, BlockLookup, FeeEstimate, Felt, FunctionCall, InvokeTransaction,
    TxHash, TxnStatus, ValidationContracts,
};

use crate::error::SignerError;

/// Everything the attestor needs from the chain and from the key holder of
/// the operational account.
#[async_trait]
pub trait Signer: Send + Sync + 'static {
    /// Operational account address.
    fn address(&self) -> &Address;

    fn validation_contracts(&self) -> &ValidationContracts;

    /// Factor applied to fee estimates before setting resource bounds.
    fn fee_multiplier(&self) -> f64 {
        FEE_ESTIMATION_MULTIPLIER
    }

    async fn call(&self, call: FunctionCall, block_id: BlockId) -> Result<Vec<Felt>, SignerError>;

    async fn block_with_tx_hashes(&self, block_id: BlockId) -> Result<BlockLookup, SignerError>;

    /// Current nonce of the operational account.
    async fn nonce(&self) -> Result<Felt, SignerError>;

    /// Unsigned `attest(block_hash)` invoke transaction with zero resource bounds.
    async fn build_attest_transaction(
        &self,
        block_hash: &BlockHash,
    ) -> Result<InvokeTransaction, SignerError>;

    /// Replaces the signature of `txn`.
    async fn sign_transaction(&self, txn: &mut InvokeTransaction) -> Result<(), SignerError>;

    async fn estimate_fee(&self, txn: &InvokeTransaction) -> Result<FeeEstimate, SignerError>;

    async fn invoke_transaction(&self, txn: &InvokeTransaction) -> Result<TxHash, SignerError>;

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxnStatus, SignerError>;
}

/// Entry point selector of a contract function.
pub fn selector(name: &str) -> Felt {
    starknet_core::utils::starknet_keccak(name.as_bytes())
}
