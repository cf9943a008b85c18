use std::sync::Arc;

use async_trait::async_trait;
use starknet_core::crypto::ecdsa_sign;
use tracing::debug;

use attestor_core::{selector, Signer, SignerError};
use attestor_types::constants::FEE_ESTIMATION_MULTIPLIER;
use attestor_types::felt::to_hex;
use attestor_types::{
    Address, BlockHash, BlockId, BlockLookup, ChainId, FeeEstimate, Felt, FunctionCall,
    InvokeTransaction, TxHash, TxnStatus, ValidationContracts,
};

use crate::client::Client;
use crate::hash::invoke_v3_hash;
use crate::wire;

const SIGN_ENDPOINT: &str = "/sign";

/// Holder of the operational account key.
pub enum SigningKey {
    /// The private key is held in memory.
    Internal { private_key: Felt },
    /// Transactions are signed by a remote service.
    External(ExternalSigner),
}

impl SigningKey {
    pub fn internal(private_key: Felt) -> Self {
        SigningKey::Internal { private_key }
    }

    pub fn external(url: &str) -> Result<Self, SignerError> {
        ExternalSigner::new(url).map(SigningKey::External)
    }

    async fn sign(
        &self,
        txn: &InvokeTransaction,
        chain_id: &ChainId,
    ) -> Result<Vec<Felt>, SignerError> {
        match self {
            SigningKey::Internal { private_key } => {
                let hash = invoke_v3_hash(txn, chain_id);
                sign_hash(private_key, &hash)
            }
            SigningKey::External(external) => external.sign(txn, chain_id).await,
        }
    }
}

/// Signs `hash` with the Stark curve ECDSA, returning `[r, s]`.
pub fn sign_hash(private_key: &Felt, hash: &Felt) -> Result<Vec<Felt>, SignerError> {
    let signature =
        ecdsa_sign(private_key, hash).map_err(|e| SignerError::Signing(e.to_string()))?;
    Ok(vec![signature.r, signature.s])
}

/// Client of a remote signing service.
///
/// The service receives `{"transaction", "chain_id"}` on `POST <url>/sign`
/// and answers `{"signature": [r, s]}`.
pub struct ExternalSigner {
    url: String,
    client: reqwest::Client,
}

impl ExternalSigner {
    pub fn new(url: &str) -> Result<Self, SignerError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SignerError::Transport(e.to_string()))?;

        Ok(Self {
            url: format!("{}{SIGN_ENDPOINT}", url.trim_end_matches('/')),
            client,
        })
    }

    pub async fn sign(
        &self,
        txn: &InvokeTransaction,
        chain_id: &ChainId,
    ) -> Result<Vec<Felt>, SignerError> {
        let request = wire::SignRequest {
            transaction: wire::invoke_transaction(txn),
            chain_id: *chain_id.as_felt(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SignerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignerError::Signing(format!(
                "server error {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let response = response
            .json::<wire::SignResponse>()
            .await
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        match response.signature.as_slice() {
            [r, s] => Ok(vec![*r, *s]),
            other => Err(SignerError::InvalidResponse(format!(
                "expected a signature of 2 elements, got {}",
                other.len()
            ))),
        }
    }
}

/// [`Signer`] backed by a Starknet JSON-RPC node.
pub struct RpcSigner {
    client: Arc<Client>,
    address: Address,
    chain_id: ChainId,
    contracts: ValidationContracts,
    key: SigningKey,
    fee_multiplier: f64,
    braavos: bool,
}

impl RpcSigner {
    pub fn new(
        client: Arc<Client>,
        address: Address,
        chain_id: ChainId,
        contracts: ValidationContracts,
        key: SigningKey,
    ) -> Self {
        Self {
            client,
            address,
            chain_id,
            contracts,
            key,
            fee_multiplier: FEE_ESTIMATION_MULTIPLIER,
            braavos: false,
        }
    }

    pub fn with_fee_multiplier(mut self, fee_multiplier: f64) -> Self {
        self.fee_multiplier = fee_multiplier;
        self
    }

    /// Braavos accounts validate fee estimations only when signed with the
    /// query version.
    pub fn with_braavos(mut self, braavos: bool) -> Self {
        self.braavos = braavos;
        self
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }
}

#[async_trait]
impl Signer for RpcSigner {
    fn address(&self) -> &Address {
        &self.address
    }

    fn validation_contracts(&self) -> &ValidationContracts {
        &self.contracts
    }

    fn fee_multiplier(&self) -> f64 {
        self.fee_multiplier
    }

    async fn call(&self, call: FunctionCall, block_id: BlockId) -> Result<Vec<Felt>, SignerError> {
        Ok(self.client.call_contract(&call, &block_id).await?)
    }

    async fn block_with_tx_hashes(&self, block_id: BlockId) -> Result<BlockLookup, SignerError> {
        Ok(self.client.get_block_with_tx_hashes(&block_id).await?)
    }

    async fn nonce(&self) -> Result<Felt, SignerError> {
        Ok(self
            .client
            .get_nonce(&self.address, &BlockId::PreConfirmed)
            .await?)
    }

    async fn build_attest_transaction(
        &self,
        block_hash: &BlockHash,
    ) -> Result<InvokeTransaction, SignerError> {
        // Single call multicall: [calls, to, selector, calldata_len, calldata..]
        let calldata = vec![
            Felt::ONE,
            *self.contracts.attest.as_felt(),
            selector("attest"),
            Felt::ONE,
            *block_hash.as_felt(),
        ];

        let nonce = self.nonce().await?;
        debug!(%block_hash, nonce = %to_hex(&nonce), "Built attest transaction");

        Ok(InvokeTransaction::new(self.address, calldata, nonce))
    }

    async fn sign_transaction(&self, txn: &mut InvokeTransaction) -> Result<(), SignerError> {
        txn.signature = self.key.sign(txn, &self.chain_id).await?;
        Ok(())
    }

    async fn estimate_fee(&self, txn: &InvokeTransaction) -> Result<FeeEstimate, SignerError> {
        if self.braavos {
            let mut query = txn.clone();
            query.version = InvokeTransaction::query_version();
            self.sign_transaction(&mut query).await?;

            return Ok(self
                .client
                .estimate_fee(&query, &BlockId::PreConfirmed)
                .await?);
        }

        Ok(self
            .client
            .estimate_fee(txn, &BlockId::PreConfirmed)
            .await?)
    }

    async fn invoke_transaction(&self, txn: &InvokeTransaction) -> Result<TxHash, SignerError> {
        Ok(self.client.add_invoke_transaction(txn).await?)
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxnStatus, SignerError> {
        Ok(self.client.get_transaction_status(hash).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use starknet_crypto::{get_public_key, verify};

    #[test]
    fn internal_signature_verifies() {
        let private_key = Felt::from_hex_unchecked(
            "0x0139fe4d6f02e666e86a6f58e65060f115cd3c185bd9e98bd829636931458f79",
        );
        let chain_id = ChainId::from_name("SN_SEPOLIA").unwrap();
        let txn = InvokeTransaction::new(
            Address::from_hex("0x123").unwrap(),
            vec![Felt::ONE],
            Felt::ZERO,
        );
        let hash = invoke_v3_hash(&txn, &chain_id);

        let signature = sign_hash(&private_key, &hash).unwrap();
        assert_eq!(signature.len(), 2);

        let public_key = get_public_key(&private_key);
        assert!(verify(&public_key, &hash, &signature[0], &signature[1]).unwrap());
    }

    #[test]
    fn external_url_gets_sign_endpoint() {
        let signer = ExternalSigner::new("http://localhost:8080/").unwrap();
        assert_eq!(signer.url, "http://localhost:8080/sign");
    }
}
