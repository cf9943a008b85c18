//! JSON shapes of the Starknet JSON-RPC API.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use attestor_types::felt::{from_hex, to_hex, to_u128, to_u64};
use attestor_types::{
    BlockHash, BlockHeader, BlockId, BlockLookup, BlockNumber, DataAvailabilityMode,
    ExecutionStatus, FeeEstimate, Felt, FinalityStatus, FunctionCall, InvokeTransaction,
    ResourceBounds, ResourceBoundsMapping, TxHash, TxnStatus,
};

pub mod felt_hex {
    use super::*;

    pub fn serialize<S: Serializer>(felt: &Felt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(felt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Felt, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex(&s).map_err(de::Error::custom)
    }
}

pub mod felt_hex_vec {
    use super::*;

    pub fn serialize<S: Serializer>(felts: &[Felt], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(felts.iter().map(to_hex))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Felt>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| from_hex(s).map_err(de::Error::custom))
            .collect()
    }
}

/// Quantities are sent as hex strings, some nodes answer with plain numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Hex(String),
    Number(u64),
}

impl Quantity {
    fn into_felt<E: de::Error>(self) -> Result<Felt, E> {
        match self {
            Quantity::Hex(s) => from_hex(&s).map_err(E::custom),
            Quantity::Number(n) => Ok(Felt::from(n)),
        }
    }
}

fn u64_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let felt = Quantity::deserialize(deserializer)?.into_felt()?;
    to_u64(&felt).map_err(de::Error::custom)
}

fn u128_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    let felt = Quantity::deserialize(deserializer)?.into_felt()?;
    to_u128(&felt).map_err(de::Error::custom)
}

pub fn block_id(id: &BlockId) -> Value {
    match id {
        BlockId::Latest => json!("latest"),
        BlockId::PreConfirmed => json!("pre_confirmed"),
        BlockId::Number(number) => json!({ "block_number": number.as_u64() }),
        BlockId::Hash(hash) => json!({ "block_hash": hash }),
    }
}

pub fn function_call(call: &FunctionCall) -> Value {
    json!({
        "contract_address": call.contract_address,
        "entry_point_selector": to_hex(&call.entry_point_selector),
        "calldata": call.calldata.iter().map(to_hex).collect::<Vec<_>>(),
    })
}

fn data_availability_mode(mode: DataAvailabilityMode) -> &'static str {
    match mode {
        DataAvailabilityMode::L1 => "L1",
        DataAvailabilityMode::L2 => "L2",
    }
}

fn resource_bounds(bounds: &ResourceBounds) -> Value {
    json!({
        "max_amount": to_hex(&Felt::from(bounds.max_amount)),
        "max_price_per_unit": to_hex(&Felt::from(bounds.max_price_per_unit)),
    })
}

fn resource_bounds_mapping(bounds: &ResourceBoundsMapping) -> Value {
    json!({
        "l1_gas": resource_bounds(&bounds.l1_gas),
        "l1_data_gas": resource_bounds(&bounds.l1_data_gas),
        "l2_gas": resource_bounds(&bounds.l2_gas),
    })
}

/// A broadcasted version 3 invoke transaction.
pub fn invoke_transaction(txn: &InvokeTransaction) -> Value {
    let felts = |felts: &[Felt]| felts.iter().map(to_hex).collect::<Vec<_>>();

    json!({
        "type": "INVOKE",
        "sender_address": txn.sender_address,
        "calldata": felts(&txn.calldata),
        "version": to_hex(&txn.version),
        "signature": felts(&txn.signature),
        "nonce": to_hex(&txn.nonce),
        "resource_bounds": resource_bounds_mapping(&txn.resource_bounds),
        "tip": to_hex(&Felt::from(txn.tip)),
        "paymaster_data": felts(&txn.paymaster_data),
        "account_deployment_data": felts(&txn.account_deployment_data),
        "nonce_data_availability_mode": data_availability_mode(txn.nonce_data_availability_mode),
        "fee_data_availability_mode": data_availability_mode(txn.fee_data_availability_mode),
    })
}

#[derive(Debug, Deserialize)]
pub struct BlockHashAndNumber {
    pub block_hash: BlockHash,
    pub block_number: BlockNumber,
}

impl From<BlockHashAndNumber> for BlockHeader {
    fn from(value: BlockHashAndNumber) -> Self {
        BlockHeader::new(value.block_number, value.block_hash)
    }
}

/// Header fields of `starknet_getBlockWithTxHashes`. A block still being
/// built has no hash.
#[derive(Debug, Deserialize)]
pub struct BlockWithTxHashes {
    pub block_hash: Option<BlockHash>,
    pub block_number: BlockNumber,
    pub parent_hash: BlockHash,
}

impl From<BlockWithTxHashes> for BlockLookup {
    fn from(block: BlockWithTxHashes) -> Self {
        match block.block_hash {
            Some(hash) => BlockLookup::Block(BlockHeader {
                number: block.block_number,
                hash,
                parent_hash: block.parent_hash,
            }),
            None => BlockLookup::PreConfirmed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeeEstimation {
    #[serde(deserialize_with = "u64_quantity")]
    pub l1_gas_consumed: u64,
    #[serde(deserialize_with = "u128_quantity")]
    pub l1_gas_price: u128,
    #[serde(deserialize_with = "u64_quantity")]
    pub l2_gas_consumed: u64,
    #[serde(deserialize_with = "u128_quantity")]
    pub l2_gas_price: u128,
    #[serde(deserialize_with = "u64_quantity")]
    pub l1_data_gas_consumed: u64,
    #[serde(deserialize_with = "u128_quantity")]
    pub l1_data_gas_price: u128,
    #[serde(deserialize_with = "u128_quantity")]
    pub overall_fee: u128,
}

impl From<FeeEstimation> for FeeEstimate {
    fn from(fee: FeeEstimation) -> Self {
        FeeEstimate {
            l1_gas_consumed: fee.l1_gas_consumed,
            l1_gas_price: fee.l1_gas_price,
            l2_gas_consumed: fee.l2_gas_consumed,
            l2_gas_price: fee.l2_gas_price,
            l1_data_gas_consumed: fee.l1_data_gas_consumed,
            l1_data_gas_price: fee.l1_data_gas_price,
            overall_fee: fee.overall_fee,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddInvokeTransactionResult {
    pub transaction_hash: TxHash,
}

#[derive(Debug, Deserialize)]
pub struct TransactionStatus {
    pub finality_status: String,
    pub execution_status: Option<String>,
    pub failure_reason: Option<String>,
}

impl TryFrom<TransactionStatus> for TxnStatus {
    type Error = String;

    fn try_from(status: TransactionStatus) -> Result<Self, Self::Error> {
        let finality_status = status.finality_status.parse::<FinalityStatus>()?;

        let execution_status = match status.execution_status.as_deref() {
            None => None,
            Some("SUCCEEDED") => Some(ExecutionStatus::Succeeded),
            Some("REVERTED") => Some(ExecutionStatus::Reverted),
            Some(other) => return Err(format!("unknown execution status {other}")),
        };

        Ok(TxnStatus {
            finality_status,
            execution_status,
            failure_reason: status.failure_reason,
        })
    }
}

/// Body of a request to an external signer.
#[derive(Debug, Serialize)]
pub struct SignRequest {
    pub transaction: Value,
    #[serde(with = "felt_hex")]
    pub chain_id: Felt,
}

#[derive(Debug, Deserialize)]
pub struct SignResponse {
    #[serde(with = "felt_hex_vec")]
    pub signature: Vec<Felt>,
}
