use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use attestor_core::{HeaderSubscriber, Subscription, SubscriptionError};
use attestor_types::BlockHeader;

/// Outcome of one call to [`MockSubscriber::subscribe`].
#[derive(Clone, Debug)]
pub enum Script {
    /// Subscribing fails.
    Fail(String),
    /// Delivers the headers, then ends the stream.
    Headers(Vec<BlockHeader>),
    /// Delivers no header and reports a subscription error.
    Error(String),
}

/// A [`HeaderSubscriber`] replaying scripted subscriptions in order. Once the
/// script is exhausted every attempt fails.
#[derive(Debug, Default)]
pub struct MockSubscriber {
    scripts: Mutex<VecDeque<Script>>,
    attempts: AtomicUsize,
}

impl MockSubscriber {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of `subscribe` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeaderSubscriber for MockSubscriber {
    async fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match script {
            None => Err(SubscriptionError("no subscription scripted".to_string())),
            Some(Script::Fail(reason)) => Err(SubscriptionError(reason)),
            Some(Script::Headers(headers)) => {
                let (header_tx, header_rx) = mpsc::channel(headers.len().max(1));
                for header in headers {
                    // The channel has room for every header
                    let _ = header_tx.try_send(header);
                }

                let (_, error_rx) = mpsc::channel(1);
                Ok(Subscription::new(header_rx, error_rx))
            }
            Some(Script::Error(reason)) => {
                let (header_tx, header_rx) = mpsc::channel::<BlockHeader>(1);
                let (error_tx, error_rx) = mpsc::channel(1);
                let _ = error_tx.try_send(SubscriptionError(reason));

                // Keeps the header stream open until the subscription is dropped
                let task = tokio::spawn(async move {
                    let _header_tx = header_tx;
                    std::future::pending::<()>().await
                });

                Ok(Subscription::new(header_rx, error_rx).with_task(task))
            }
        }
    }
}
