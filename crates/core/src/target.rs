//! Selection of the block a validator must attest to in a given epoch.
//!
//! The staking contract verifies attestations against the same rule, so the
//! computation has to match it exactly: Poseidon over `(stake, epoch_id,
//! staker_address)`, reduced modulo `epoch_len - attest_window`, offset from
//! the first block of the epoch.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use starknet_crypto::poseidon_hash_many;

use attestor_types::constants::MIN_ATTESTATION_WINDOW;
use attestor_types::{AttestInfo, BlockHash, BlockNumber, EpochInfo, Felt};

use crate::error::Error;

/// Block number the validator must attest to.
///
/// Requires `epoch.epoch_len > attest_window`, see [`attest_info`].
pub fn compute_block_number_to_attest_to(epoch: &EpochInfo, attest_window: u64) -> BlockNumber {
    let hash = poseidon_hash_many(&[
        Felt::from(epoch.stake),
        Felt::from(epoch.epoch_id),
        *epoch.staker_address.as_felt(),
    ]);

    let modulus = epoch.epoch_len.saturating_sub(attest_window).max(1);
    let offset = BigUint::from_bytes_be(&hash.to_bytes_be()) % BigUint::from(modulus);

    // offset < modulus, which is a u64
    epoch.starting_block + offset.to_u64().unwrap_or_default()
}

/// Target block and attestation window for `epoch`.
pub fn attest_info(epoch: &EpochInfo, attest_window: u64) -> Result<AttestInfo, Error> {
    if epoch.epoch_len <= attest_window {
        return Err(Error::InvalidAttestWindow {
            epoch_len: epoch.epoch_len,
            attest_window,
        });
    }

    let target_block = compute_block_number_to_attest_to(epoch, attest_window);

    Ok(AttestInfo {
        target_block,
        target_block_hash: BlockHash::ZERO,
        window_start: target_block + MIN_ATTESTATION_WINDOW,
        window_end: target_block + attest_window,
    })
}
