//! Channel between the block header watcher and the dispatcher.
//!
//! Sending waits until the dispatcher has taken the event, so at most one
//! event is in flight and header processing never runs ahead of attestation
//! handling. Dropping every [`EventSender`] stops the dispatcher.

use tokio::sync::{mpsc, oneshot};

use attestor_types::BlockHash;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttestEvent {
    /// Build and sign the attestation for this target block hash.
    PrepareAttest(BlockHash),
    /// Make sure the attestation for this target block hash is submitted.
    DoAttest(BlockHash),
    /// The attestation window just closed.
    EndOfWindow,
}

#[derive(Debug)]
struct Envelope {
    event: AttestEvent,
    accepted: oneshot::Sender<()>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("event receiver dropped")]
pub struct EventChannelClosed;

#[derive(Clone, Debug)]
pub struct EventSender(mpsc::Sender<Envelope>);

impl EventSender {
    /// Hands `event` to the dispatcher, returning once it has been accepted.
    pub async fn send(&self, event: AttestEvent) -> Result<(), EventChannelClosed> {
        let (accepted, rx) = oneshot::channel();

        self.0
            .send(Envelope { event, accepted })
            .await
            .map_err(|_| EventChannelClosed)?;

        rx.await.map_err(|_| EventChannelClosed)
    }
}

#[derive(Debug)]
pub struct EventReceiver(mpsc::Receiver<Envelope>);

impl EventReceiver {
    /// Next event, or `None` once all senders are gone.
    pub async fn recv(&mut self) -> Option<AttestEvent> {
        let Envelope { event, accepted } = self.0.recv().await?;
        let _ = accepted.send(());
        Some(event)
    }
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (EventSender(tx), EventReceiver(rx))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn send_waits_for_the_receiver() {
        let (tx, mut rx) = event_channel();

        let send = tokio::spawn(async move { tx.send(AttestEvent::EndOfWindow).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!send.is_finished());

        assert_eq!(rx.recv().await, Some(AttestEvent::EndOfWindow));
        assert_eq!(send.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn dropping_senders_closes_the_receiver() {
        let (tx, mut rx) = event_channel();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn send_fails_without_receiver() {
        let (tx, rx) = event_channel();
        drop(rx);
        assert_eq!(
            tx.send(AttestEvent::PrepareAttest(BlockHash::ZERO)).await,
            Err(EventChannelClosed)
        );
    }
}
