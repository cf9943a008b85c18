use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Url;
use serde::{de, Deserialize};
use serde_json::{json, Value};
use tracing::trace;

use attestor_types::felt::{from_hex, to_hex};
use attestor_types::{
    Address, BlockHeader, BlockId, BlockLookup, ChainId, FeeEstimate, Felt, FunctionCall,
    InvokeTransaction, TxHash, TxnStatus,
};

use crate::error::ClientError;
use crate::wire;

/// This is an alias for the result type returned by the [`Client`].
pub type ClientResult<T> = Result<T, ClientError>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An `async` client for a Starknet JSON-RPC node.
#[derive(Debug)]
pub struct Client {
    url: Url,
    client: reqwest::Client,
    id: AtomicUsize,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Response<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

impl Client {
    pub fn new(url: &str) -> ClientResult<Self> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(url.to_string(), e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Other(format!("Could not create client: {e}")))?;

        trace!(%url, "Created starknet client");

        Ok(Self {
            url,
            client,
            id: AtomicUsize::new(0),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn next_id(&self) -> usize {
        self.id.fetch_add(1, Ordering::AcqRel)
    }

    async fn call<T: de::DeserializeOwned + fmt::Debug>(
        &self,
        method: &str,
        params: Value,
    ) -> ClientResult<T> {
        let id = self.next_id();
        trace!(%method, %params, %id, "Calling starknet node");

        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(ClientError::from_reqwest)?;

        let data = response
            .json::<Response<T>>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        trace!(?data, "Response received");

        if let Some(err) = data.error {
            return Err(ClientError::Server {
                code: err.code,
                message: err.message,
                data: err.data.map(|data| match data {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }

        data.result.ok_or(ClientError::EmptyResponse)
    }

    pub async fn chain_id(&self) -> ClientResult<ChainId> {
        let chain_id: String = self.call("starknet_chainId", json!([])).await?;
        let felt = from_hex(&chain_id).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(ChainId::new(felt))
    }

    /// Number and hash of the latest accepted block.
    pub async fn block_hash_and_number(&self) -> ClientResult<BlockHeader> {
        let latest: wire::BlockHashAndNumber = self
            .call("starknet_blockHashAndNumber", json!([]))
            .await?;
        Ok(latest.into())
    }

    pub async fn get_block_with_tx_hashes(&self, block_id: &BlockId) -> ClientResult<BlockLookup> {
        let block: wire::BlockWithTxHashes = self
            .call(
                "starknet_getBlockWithTxHashes",
                json!({ "block_id": wire::block_id(block_id) }),
            )
            .await?;
        Ok(block.into())
    }

    pub async fn call_contract(
        &self,
        call: &FunctionCall,
        block_id: &BlockId,
    ) -> ClientResult<Vec<Felt>> {
        let result: Vec<String> = self
            .call(
                "starknet_call",
                json!({
                    "request": wire::function_call(call),
                    "block_id": wire::block_id(block_id),
                }),
            )
            .await?;

        result
            .iter()
            .map(|s| from_hex(s).map_err(|e| ClientError::Parse(e.to_string())))
            .collect()
    }

    pub async fn get_nonce(&self, address: &Address, block_id: &BlockId) -> ClientResult<Felt> {
        let nonce: String = self
            .call(
                "starknet_getNonce",
                json!({
                    "block_id": wire::block_id(block_id),
                    "contract_address": address,
                }),
            )
            .await?;

        from_hex(&nonce).map_err(|e| ClientError::Parse(e.to_string()))
    }

    pub async fn estimate_fee(
        &self,
        txn: &InvokeTransaction,
        block_id: &BlockId,
    ) -> ClientResult<FeeEstimate> {
        let estimates: Vec<wire::FeeEstimation> = self
            .call(
                "starknet_estimateFee",
                json!({
                    "request": [wire::invoke_transaction(txn)],
                    "simulation_flags": [],
                    "block_id": wire::block_id(block_id),
                }),
            )
            .await?;

        estimates
            .into_iter()
            .next()
            .map(FeeEstimate::from)
            .ok_or(ClientError::EmptyResponse)
    }

    pub async fn add_invoke_transaction(&self, txn: &InvokeTransaction) -> ClientResult<TxHash> {
        let result: wire::AddInvokeTransactionResult = self
            .call(
                "starknet_addInvokeTransaction",
                json!({ "invoke_transaction": wire::invoke_transaction(txn) }),
            )
            .await?;
        Ok(result.transaction_hash)
    }

    pub async fn get_transaction_status(&self, hash: &TxHash) -> ClientResult<TxnStatus> {
        let status: wire::TransactionStatus = self
            .call(
                "starknet_getTransactionStatus",
                json!({ "transaction_hash": to_hex(hash.as_felt()) }),
            )
            .await?;

        TxnStatus::try_from(status).map_err(ClientError::Parse)
    }
}
