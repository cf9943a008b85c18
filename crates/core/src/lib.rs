//! Attestation logic of a Starknet validator: epoch tracking, target block
//! selection, window classification and the dispatcher that submits one
//! attestation per epoch.

use std::sync::Arc;

use tracing::debug;

use attestor_metrics::Metrics;

mod balance;
pub use balance::{check_balance, fetch_validator_balance};

mod dispatcher;
pub use dispatcher::Dispatcher;

mod epoch;
pub use epoch::{
    correct_epoch_switch, fetch_attest_window, fetch_epoch_and_attest_info,
    fetch_epoch_and_attest_info_with_retry, fetch_epoch_info, set_target_block_hash_if_exists,
};

mod error;
pub use error::{AttestError, Error, SignerError};

mod event;
pub use event::{event_channel, AttestEvent, EventChannelClosed, EventReceiver, EventSender};

mod retry;
pub use retry::RetryPolicy;

mod signer;
pub use signer::{selector, Signer};

mod target;
pub use target::{attest_info, compute_block_number_to_attest_to};

mod tracker;
pub use tracker::{track_attest, AttestStatus, AttestTracker, AttestTransaction};

mod watcher;
pub use watcher::{
    process_block_headers, run_block_header_watcher, HeaderSubscriber, Subscription,
    SubscriptionError,
};

mod window;
pub use window::{classify, WindowPhase};

/// Runs the attestor until the header watcher fails.
///
/// The dispatcher runs on its own task and is drained before returning.
pub async fn run_attestor<S, H>(
    signer: Arc<S>,
    subscriber: H,
    epoch_policy: RetryPolicy,
    reconnect_policy: RetryPolicy,
    metrics: Metrics,
) -> Result<(), Error>
where
    S: Signer,
    H: HeaderSubscriber,
{
    tokio::spawn(check_balance(Arc::clone(&signer), metrics.clone()));

    let (events, receiver) = event_channel();
    let dispatcher = Dispatcher::new(Arc::clone(&signer), metrics.clone());
    let dispatcher = tokio::spawn(dispatcher.run(receiver));

    let result = run_block_header_watcher(
        &subscriber,
        signer.as_ref(),
        &events,
        &epoch_policy,
        &reconnect_policy,
        &metrics,
    )
    .await;

    drop(events);
    if let Err(err) = dispatcher.await {
        debug!(%err, "Dispatcher task did not complete");
    }

    result
}
