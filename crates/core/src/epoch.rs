use tracing::{debug, info};

use attestor_types::felt::{to_u128, to_u64};
use attestor_types::{Address, AttestInfo, BlockId, BlockLookup, BlockNumber, EpochInfo, FunctionCall};

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::signer::{selector, Signer};
use crate::target::attest_info;

const EPOCH_INFO_ENTRYPOINT: &str = "get_attestation_info_by_operational_address";
const ATTEST_WINDOW_ENTRYPOINT: &str = "attestation_window";

pub async fn fetch_epoch_info<S: Signer>(signer: &S) -> Result<EpochInfo, Error> {
    let call = FunctionCall {
        contract_address: signer.validation_contracts().staking,
        entry_point_selector: selector(EPOCH_INFO_ENTRYPOINT),
        calldata: vec![*signer.address().as_felt()],
    };

    let result = signer
        .call(call, BlockId::Latest)
        .await
        .map_err(|source| Error::EntrypointCall {
            entrypoint: EPOCH_INFO_ENTRYPOINT,
            source,
        })?;

    let invalid = || Error::entrypoint_response(EPOCH_INFO_ENTRYPOINT, &result);

    let [staker, stake, epoch_len, epoch_id, starting_block] = result.as_slice() else {
        return Err(invalid());
    };

    Ok(EpochInfo {
        staker_address: Address::new(*staker),
        stake: to_u128(stake).map_err(|_| invalid())?,
        epoch_len: to_u64(epoch_len).map_err(|_| invalid())?,
        epoch_id: to_u64(epoch_id).map_err(|_| invalid())?,
        starting_block: BlockNumber::new(to_u64(starting_block).map_err(|_| invalid())?),
    })
}

pub async fn fetch_attest_window<S: Signer>(signer: &S) -> Result<u64, Error> {
    let call = FunctionCall {
        contract_address: signer.validation_contracts().attest,
        entry_point_selector: selector(ATTEST_WINDOW_ENTRYPOINT),
        calldata: Vec::new(),
    };

    let result = signer
        .call(call, BlockId::Latest)
        .await
        .map_err(|source| Error::EntrypointCall {
            entrypoint: ATTEST_WINDOW_ENTRYPOINT,
            source,
        })?;

    match result.as_slice() {
        [window] => to_u64(window)
            .map_err(|_| Error::entrypoint_response(ATTEST_WINDOW_ENTRYPOINT, &result)),
        _ => Err(Error::entrypoint_response(ATTEST_WINDOW_ENTRYPOINT, &result)),
    }
}

/// Reads the current epoch and the attestation window, and derives the block
/// to attest to.
pub async fn fetch_epoch_and_attest_info<S: Signer>(
    signer: &S,
) -> Result<(EpochInfo, AttestInfo), Error> {
    let epoch = fetch_epoch_info(signer).await?;
    debug!(
        epoch_id = epoch.epoch_id,
        starting_block = %epoch.starting_block,
        ending_block = %epoch.end_block(),
        "Fetched epoch info"
    );

    let attest_window = fetch_attest_window(signer).await?;
    let attest = attest_info(&epoch, attest_window)?;

    info!(
        "Target block to attest to at {}. Attestation window: {} <> {}",
        attest.target_block, attest.window_start, attest.window_end
    );

    Ok((epoch, attest))
}

/// Checks that `next` is the epoch directly following `prev`.
pub fn correct_epoch_switch(prev: &EpochInfo, next: &EpochInfo) -> bool {
    prev.is_followed_by(next)
}

/// Fetches epoch and attestation info, retrying on failure or when the fetched
/// epoch is not an acceptable successor of `prev_epoch`.
///
/// Without a previous epoch (at startup) any fetched epoch is accepted.
/// `epoch_id` only labels the attempt in logs and errors.
pub async fn fetch_epoch_and_attest_info_with_retry<S, F>(
    signer: &S,
    prev_epoch: Option<&EpochInfo>,
    is_switch_valid: F,
    policy: &RetryPolicy,
    epoch_id: &str,
) -> Result<(EpochInfo, AttestInfo), Error>
where
    S: Signer,
    F: Fn(&EpochInfo, &EpochInfo) -> bool,
{
    let accepted = |next: &EpochInfo| prev_epoch.is_none_or(|prev| is_switch_valid(prev, next));

    let mut retries = policy.retries;
    let mut result = fetch_epoch_and_attest_info(signer).await;

    while !retries.is_zero() {
        match &result {
            Ok((next, _)) if accepted(next) => break,
            Ok((next, _)) => debug!(from = ?prev_epoch, to = %next, "Wrong epoch switch"),
            Err(err) => debug!(epoch_id, %err, "Failed to fetch epoch info"),
        }
        debug!("Retrying to fetch epoch info: {retries} retries remaining");

        policy.sleep().await;

        result = fetch_epoch_and_attest_info(signer).await;
        retries.sub();
    }

    match result {
        Err(err) => Err(Error::EpochFetch {
            retries: policy.retries,
            epoch_id: epoch_id.to_string(),
            source: Box::new(err),
        }),
        Ok((next, _)) if !accepted(&next) => Err(Error::WrongEpochSwitch {
            retries: policy.retries,
            // accepted() only fails when there is a previous epoch
            prev: prev_epoch.copied().unwrap_or(next),
            next,
        }),
        Ok(infos) => Ok(infos),
    }
}

/// Records the target block hash if the block is already on chain, which is
/// the case when starting in the middle of an epoch. A missing or still
/// pre-confirmed block is not an error: its hash will come with the header.
pub async fn set_target_block_hash_if_exists<S: Signer>(signer: &S, attest: &mut AttestInfo) {
    match signer
        .block_with_tx_hashes(BlockId::Number(attest.target_block))
        .await
    {
        Ok(BlockLookup::Block(header)) => {
            attest.target_block_hash = header.hash;
            info!(
                target_block = %attest.target_block,
                block_hash = %header.hash,
                "Target block already exists, registering block hash"
            );
        }
        Ok(BlockLookup::PreConfirmed) => {
            debug!(target_block = %attest.target_block, "Target block is not closed yet");
        }
        Err(err) => {
            debug!(target_block = %attest.target_block, %err, "Target block not available yet");
        }
    }
}
