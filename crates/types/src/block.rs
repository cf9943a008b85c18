use core::fmt;

use serde::{Deserialize, Serialize};

use crate::felt::Felt;
use crate::primitives::{Address, BlockHash, BlockNumber};

/// Selects the block a read is evaluated against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockId {
    Latest,
    PreConfirmed,
    Number(BlockNumber),
    Hash(BlockHash),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Latest => write!(f, "latest"),
            BlockId::PreConfirmed => write!(f, "pre_confirmed"),
            BlockId::Number(n) => write!(f, "{n}"),
            BlockId::Hash(h) => write!(f, "{h}"),
        }
    }
}

/// The part of a block header the attestor looks at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: BlockNumber,
    pub hash: BlockHash,
    pub parent_hash: BlockHash,
}

impl BlockHeader {
    pub fn new(number: BlockNumber, hash: BlockHash) -> Self {
        Self {
            number,
            hash,
            parent_hash: BlockHash::ZERO,
        }
    }
}

/// Result of looking a block up by id: either a closed block, or a block
/// that is still being built and has no hash yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockLookup {
    Block(BlockHeader),
    PreConfirmed,
}

/// A read-only contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    pub contract_address: Address,
    pub entry_point_selector: Felt,
    pub calldata: Vec<Felt>,
}
