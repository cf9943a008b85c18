use core::fmt;

use serde::Serialize;

use crate::primitives::{Address, BlockHash, BlockNumber};

/// The staking contract's view of the current epoch for one validator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EpochInfo {
    pub staker_address: Address,
    pub stake: u128,
    pub epoch_len: u64,
    pub epoch_id: u64,
    #[serde(rename = "current_epoch_starting_block")]
    pub starting_block: BlockNumber,
}

impl EpochInfo {
    /// First block of the following epoch.
    pub fn end_block(&self) -> BlockNumber {
        self.starting_block + self.epoch_len
    }

    /// Whether `next` is the only admissible successor of `self`: the next
    /// epoch id, starting right where this epoch ends.
    pub fn is_followed_by(&self, next: &EpochInfo) -> bool {
        next.epoch_id == self.epoch_id + 1 && next.starting_block == self.end_block()
    }
}

impl fmt::Display for EpochInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"staker_address\":\"{}\",\"stake\":{},\"epoch_len\":{},\"epoch_id\":{},\"current_epoch_starting_block\":{}}}",
            self.staker_address, self.stake, self.epoch_len, self.epoch_id, self.starting_block,
        )
    }
}

/// Where the attestation for the current epoch must point and when it may land.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttestInfo {
    pub target_block: BlockNumber,
    /// Zero until the target block has been observed.
    pub target_block_hash: BlockHash,
    pub window_start: BlockNumber,
    pub window_end: BlockNumber,
}
