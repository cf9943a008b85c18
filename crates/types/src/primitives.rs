use core::fmt;
use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::felt::{self, felt_newtype, Felt, FeltError};

felt_newtype! {
    /// A contract or account address.
    Address
}

felt_newtype! {
    /// The hash of a block.
    BlockHash
}

felt_newtype! {
    /// The hash of a submitted transaction.
    TxHash
}

felt_newtype! {
    /// A chain identifier, a short string such as `SN_MAIN`.
    ChainId
}

impl ChainId {
    pub fn from_name(name: &str) -> Result<Self, FeltError> {
        felt::from_short_string(name).map(Self::new)
    }

    pub fn name(&self) -> String {
        felt::to_short_string(self.as_felt())
    }
}

/// The height of a block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn increment(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of blocks from `self` until `other`, zero if `other` is not ahead.
    pub const fn blocks_until(&self, other: BlockNumber) -> u64 {
        other.0.saturating_sub(self.0)
    }
}

impl From<u64> for BlockNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl Add<u64> for BlockNumber {
    type Output = BlockNumber;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<u64> for BlockNumber {
    type Output = BlockNumber;

    fn sub(self, rhs: u64) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
