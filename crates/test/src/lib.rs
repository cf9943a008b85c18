//! Scriptable stand-ins for the chain and the header subscription, plus
//! builders for epochs and header feeds.

mod signer;
pub use signer::{Calls, MockSigner};

mod subscriber;
pub use subscriber::{MockSubscriber, Script};

use attestor_types::{Address, BlockHash, BlockHeader, BlockNumber, EpochInfo, Felt};

/// Staker used by [`epoch_info`].
pub const STAKER_ADDRESS: &str =
    "0x011efbf2806a9f6fe043c91c176ed88c38907379e59d2d3413a00eeeef08aa7e";

/// Stake used by [`epoch_info`], 1 STRK.
pub const STAKE: u128 = 1_000_000_000_000_000_000;

/// Attestation window used by [`MockSigner`] unless overridden.
pub const ATTEST_WINDOW: u64 = 16;

/// Epoch 1516 of [`STAKER_ADDRESS`] starting at block 639270 attests to block 639291.
pub const EPOCH_1516_TARGET_HASH: &str =
    "0x6d8dc0a8bdf98854b6bc146cb7cab6cddda85619c6ae2948ee65da25815e045";

/// Epoch 1517 of [`STAKER_ADDRESS`] starting at block 639310 attests to block 639316.
pub const EPOCH_1517_TARGET_HASH: &str =
    "0x2124ae375432a16ef644f539c3b148f63c706067bf576088f32033fe59c345e";

/// Block hash of every header produced by [`header_feed`] that is not a target.
pub const FILLER_HASH: BlockHash = BlockHash::new(Felt::ONE);

pub fn staker_address() -> Address {
    Address::from_hex(STAKER_ADDRESS).expect("valid staker address")
}

pub fn block_hash(hex: &str) -> BlockHash {
    BlockHash::from_hex(hex).expect("valid block hash")
}

pub fn epoch_info(epoch_id: u64, starting_block: u64, epoch_len: u64) -> EpochInfo {
    EpochInfo {
        staker_address: staker_address(),
        stake: STAKE,
        epoch_len,
        epoch_id,
        starting_block: BlockNumber::new(starting_block),
    }
}

/// `len` consecutive headers from `start`. Blocks listed in `targets` get the
/// given hash, all others [`FILLER_HASH`].
pub fn header_feed(start: u64, len: u64, targets: &[(u64, BlockHash)]) -> Vec<BlockHeader> {
    (start..start + len)
        .map(|number| {
            let hash = targets
                .iter()
                .find(|(target, _)| *target == number)
                .map_or(FILLER_HASH, |(_, hash)| *hash);

            BlockHeader::new(BlockNumber::new(number), hash)
        })
        .collect()
}
