use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use attestor_core::{HeaderSubscriber, Subscription, SubscriptionError};
use attestor_types::{BlockHeader, BlockId, BlockLookup, BlockNumber};

use crate::client::Client;
use crate::error::ClientError;

const HEADER_BUFFER: usize = 64;
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Header subscription polling the latest block of a JSON-RPC node.
///
/// Every block number is emitted once and in order. Blocks produced between
/// two polls are fetched one by one. Any RPC failure ends the subscription.
pub struct PollingSubscriber {
    client: Arc<Client>,
    poll_interval: Duration,
}

impl PollingSubscriber {
    pub fn new(client: Arc<Client>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }
}

#[async_trait]
impl HeaderSubscriber for PollingSubscriber {
    async fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        let latest = self
            .client
            .block_hash_and_number()
            .await
            .map_err(|e| SubscriptionError(e.to_string()))?;

        debug!(url = %self.client.url(), latest_block = %latest.number, "Subscribed to block headers");

        let (headers_tx, headers_rx) = mpsc::channel(HEADER_BUFFER);
        let (errors_tx, errors_rx) = mpsc::channel(1);

        let task = tokio::spawn(poll_headers(
            Arc::clone(&self.client),
            self.poll_interval,
            latest,
            headers_tx,
            errors_tx,
        ));

        Ok(Subscription::new(headers_rx, errors_rx).with_task(task))
    }
}

enum PollError {
    Client(ClientError),
    Closed,
}

impl From<ClientError> for PollError {
    fn from(err: ClientError) -> Self {
        PollError::Client(err)
    }
}

async fn poll_headers(
    client: Arc<Client>,
    poll_interval: Duration,
    first: BlockHeader,
    headers: mpsc::Sender<BlockHeader>,
    errors: mpsc::Sender<SubscriptionError>,
) {
    let mut next = first.number;
    let mut latest = Some(first);

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        let result = match latest.take() {
            Some(latest) => emit_until(&client, &mut next, latest, &headers).await,
            None => match client.block_hash_and_number().await {
                Ok(latest) => emit_until(&client, &mut next, latest, &headers).await,
                Err(err) => Err(err.into()),
            },
        };

        match result {
            Ok(()) => {}
            Err(PollError::Closed) => return,
            Err(PollError::Client(err)) => {
                let _ = errors.send(SubscriptionError(err.to_string())).await;
                return;
            }
        }

        ticker.tick().await;
    }
}

/// Sends every header from `next` up to `latest`, fetching the ones in between.
async fn emit_until(
    client: &Client,
    next: &mut BlockNumber,
    latest: BlockHeader,
    headers: &mpsc::Sender<BlockHeader>,
) -> Result<(), PollError> {
    while *next < latest.number {
        let header = match client.get_block_with_tx_hashes(&BlockId::Number(*next)).await? {
            BlockLookup::Block(header) => header,
            BlockLookup::PreConfirmed => return Ok(()),
        };

        trace!(number = %header.number, "Back-filling block header");
        headers.send(header).await.map_err(|_| PollError::Closed)?;
        *next = next.increment();
    }

    if *next == latest.number {
        headers.send(latest).await.map_err(|_| PollError::Closed)?;
        *next = next.increment();
    }

    Ok(())
}
