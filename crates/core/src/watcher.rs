//! Block header processing and the subscription loop around it.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use attestor_metrics::Metrics;
use attestor_types::{AttestInfo, BlockHeader, BlockNumber, EpochInfo};

use crate::epoch::{
    correct_epoch_switch, fetch_epoch_and_attest_info_with_retry, set_target_block_hash_if_exists,
};
use crate::error::Error;
use crate::event::{AttestEvent, EventSender};
use crate::retry::RetryPolicy;
use crate::signer::Signer;
use crate::window::{classify, WindowPhase};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SubscriptionError(pub String);

/// A live stream of block headers.
///
/// An error on `errors` ends the subscription. Dropping it stops the task
/// feeding it, if any.
#[derive(Debug)]
pub struct Subscription {
    pub headers: mpsc::Receiver<BlockHeader>,
    pub errors: mpsc::Receiver<SubscriptionError>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(
        headers: mpsc::Receiver<BlockHeader>,
        errors: mpsc::Receiver<SubscriptionError>,
    ) -> Self {
        Self {
            headers,
            errors,
            task: None,
        }
    }

    /// Ties the lifetime of `task` to the subscription.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Source of block header subscriptions.
#[async_trait]
pub trait HeaderSubscriber: Send + Sync {
    async fn subscribe(&self) -> Result<Subscription, SubscriptionError>;
}

fn log_new_epoch(epoch: &EpochInfo, attest: &AttestInfo) {
    info!(
        epoch_length = epoch.epoch_len,
        start_block = %epoch.starting_block,
        end_block = %epoch.end_block(),
        "Epoch {} started",
        epoch.epoch_id
    );
    info!(
        target_block = %attest.target_block,
        window_start_block = %attest.window_start,
        window_end_block = %attest.window_end,
        "Attest info"
    );
}

fn log_block(number: BlockNumber, epoch: &EpochInfo, attest: &AttestInfo) {
    if number < attest.window_start {
        info!(
            "Block {number} received, {} blocks to attest",
            number.blocks_until(attest.window_start)
        );
    } else if number < attest.window_end {
        info!(
            "Block {number} received, {} blocks before end of window",
            number.blocks_until(attest.window_end)
        );
    } else {
        info!(
            "Block {number} received, {} blocks for the next epoch",
            number.blocks_until(epoch.end_block())
        );
    }
}

/// Tracks the epoch across `headers` and turns every header into the
/// attestation event of its window phase.
///
/// Returns `Ok(())` when the header stream ends, and an error when the epoch
/// cannot be fetched, the epoch switch is wrong, or the dispatcher is gone.
pub async fn process_block_headers<S: Signer>(
    headers: &mut mpsc::Receiver<BlockHeader>,
    signer: &S,
    events: &EventSender,
    policy: &RetryPolicy,
    metrics: &Metrics,
) -> Result<(), Error> {
    let (mut epoch, mut attest) =
        fetch_epoch_and_attest_info_with_retry(signer, None, |_, _| true, policy, "at app startup")
            .await?;

    set_target_block_hash_if_exists(signer, &mut attest).await;

    log_new_epoch(&epoch, &attest);
    metrics.update_epoch_info(&epoch, &attest);

    while let Some(header) = headers.recv().await {
        log_block(header.number, &epoch, &attest);
        metrics.update_latest_block_number(header.number);

        if header.number >= epoch.end_block() {
            let next_epoch_id = (epoch.epoch_id + 1).to_string();
            (epoch, attest) = fetch_epoch_and_attest_info_with_retry(
                signer,
                Some(&epoch),
                correct_epoch_switch,
                policy,
                &next_epoch_id,
            )
            .await?;

            log_new_epoch(&epoch, &attest);
            metrics.update_epoch_info(&epoch, &attest);
        }

        let event = match classify(header.number, &attest) {
            Some(WindowPhase::TargetReached) => {
                attest.target_block_hash = header.hash;
                info!(block_hash = %header.hash, "Target block reached");
                AttestEvent::PrepareAttest(attest.target_block_hash)
            }
            Some(WindowPhase::Prepare) => AttestEvent::PrepareAttest(attest.target_block_hash),
            Some(WindowPhase::Attest) => AttestEvent::DoAttest(attest.target_block_hash),
            Some(WindowPhase::EndOfWindow) => AttestEvent::EndOfWindow,
            None => continue,
        };

        events
            .send(event)
            .await
            .map_err(|_| Error::DispatcherClosed)?;
    }

    Ok(())
}

/// Subscribes to block headers and processes them until a fatal error.
///
/// Failed subscription attempts consume `reconnect` retries, which are reset
/// by every successful subscription. A subscription that errors or ends is
/// replaced by a new one. Errors from [`process_block_headers`] are returned.
#[tracing::instrument(name = "watcher", skip_all)]
pub async fn run_block_header_watcher<S, H>(
    subscriber: &H,
    signer: &S,
    events: &EventSender,
    epoch_policy: &RetryPolicy,
    reconnect_policy: &RetryPolicy,
    metrics: &Metrics,
) -> Result<(), Error>
where
    S: Signer,
    H: HeaderSubscriber,
{
    let mut retries = reconnect_policy.retries;

    loop {
        let mut subscription = match subscriber.subscribe().await {
            Ok(subscription) => subscription,
            Err(source) => {
                if retries.is_zero() {
                    return Err(Error::Subscribe {
                        retries: reconnect_policy.retries,
                        source,
                    });
                }

                error!("Cannot subscribe to block headers, {retries} retries left");
                debug!(%source, "Subscription failure");

                retries.sub();
                reconnect_policy.sleep().await;
                continue;
            }
        };
        retries.reset();

        tokio::select! {
            result = process_block_headers(
                &mut subscription.headers,
                signer,
                events,
                epoch_policy,
                metrics,
            ) => {
                if let Err(err) = result {
                    error!(%err, "Processing block headers");
                    return Err(err);
                }
                warn!("Block header stream ended, subscribing again");
            }
            Some(err) = subscription.errors.recv() => {
                error!(%err, "Block header subscription error");
                debug!("Ending headers subscription and subscribing again");
            }
        }
    }
}
