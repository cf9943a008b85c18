use std::sync::Arc;

use tracing::{debug, error, info, warn};

use attestor_metrics::Metrics;
use attestor_types::BlockHash;

use crate::balance::check_balance;
use crate::event::{AttestEvent, EventReceiver};
use crate::signer::Signer;
use crate::tracker::{AttestStatus, AttestTracker};

/// Owns the attestation of the current window and reacts to window events.
pub struct Dispatcher<S> {
    signer: Arc<S>,
    metrics: Metrics,
    tracker: AttestTracker,
}

impl<S: Signer> Dispatcher<S> {
    pub fn new(signer: Arc<S>, metrics: Metrics) -> Self {
        Self {
            signer,
            metrics,
            tracker: AttestTracker::new(),
        }
    }

    pub fn tracker(&self) -> &AttestTracker {
        &self.tracker
    }

    /// Handles events until every sender is dropped.
    #[tracing::instrument(name = "dispatcher", skip_all)]
    pub async fn run(mut self, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }

        debug!("Event channel closed, dispatcher stopped");
    }

    pub async fn handle(&mut self, event: AttestEvent) {
        match event {
            AttestEvent::PrepareAttest(block_hash) => self.prepare_attest(block_hash).await,
            AttestEvent::DoAttest(block_hash) => self.do_attest(block_hash).await,
            AttestEvent::EndOfWindow => self.end_of_window().await,
        }
    }

    async fn prepare_attest(&mut self, block_hash: BlockHash) {
        if block_hash.is_zero() {
            warn!("Received PrepareAttest without target block hash, ignoring");
            return;
        }

        self.track_target(block_hash);

        if self.tracker.status != AttestStatus::Idle || self.tracker.transaction.is_valid() {
            return;
        }

        match self
            .tracker
            .transaction
            .build(self.signer.as_ref(), &block_hash)
            .await
        {
            Ok(()) => debug!(%block_hash, "Attest transaction built"),
            Err(err) => warn!(%block_hash, %err, "Failed to build attest transaction"),
        }
    }

    async fn do_attest(&mut self, block_hash: BlockHash) {
        if block_hash.is_zero() {
            warn!("Received DoAttest without target block hash, ignoring");
            return;
        }

        self.track_target(block_hash);

        if self.tracker.status == AttestStatus::Ongoing {
            self.poll_status().await;
        }

        if matches!(
            self.tracker.status,
            AttestStatus::Ongoing | AttestStatus::Successful
        ) {
            return;
        }

        let signer = Arc::clone(&self.signer);
        let transaction = &mut self.tracker.transaction;

        let ready = if transaction.is_valid() {
            transaction.update_nonce(signer.as_ref()).await
        } else {
            transaction.build(signer.as_ref(), &block_hash).await
        };

        if let Err(err) = ready {
            error!(%block_hash, %err, "Failed to prepare attest transaction");
            self.fail();
            return;
        }

        info!(%block_hash, "Invoking attest");

        match self.tracker.transaction.invoke(signer.as_ref()).await {
            Ok(transaction_hash) => {
                info!(%transaction_hash, "Attest transaction sent");
                self.tracker.hash = transaction_hash;
                self.tracker.set_status(AttestStatus::Ongoing);
                self.metrics.record_attestation_submitted();
            }
            Err(err) if err.is_already_done() => {
                info!(%block_hash, "Attestation already done for this epoch");
                self.tracker.set_status(AttestStatus::Successful);
            }
            Err(err) => {
                error!(%block_hash, %err, "Failed to attest");
                self.fail();
            }
        }
    }

    async fn end_of_window(&mut self) {
        info!("End of window reached");

        if self.tracker.status == AttestStatus::Ongoing {
            self.poll_status().await;
        }

        if self.tracker.status == AttestStatus::Successful {
            info!(
                transaction_hash = %self.tracker.hash,
                "Successfully attested to target block"
            );
            self.metrics.record_attestation_confirmed();
        } else {
            error!(status = %self.tracker.status, "Failed to attest to target block");
        }

        tokio::spawn(check_balance(Arc::clone(&self.signer), self.metrics.clone()));

        self.tracker = AttestTracker::new();
    }

    /// Starts a fresh tracker when `block_hash` is not the block the current
    /// one attests to, as if the window had ended.
    fn track_target(&mut self, block_hash: BlockHash) {
        let previous = self.tracker.target;

        if !previous.is_zero() && previous != block_hash {
            warn!(
                %previous,
                %block_hash,
                status = %self.tracker.status,
                "Target block changed without end of window, starting a new attestation"
            );
            self.tracker = AttestTracker::new();
        }

        self.tracker.target = block_hash;
    }

    async fn poll_status(&mut self) {
        self.tracker.update_status(self.signer.as_ref()).await;

        if self.tracker.status == AttestStatus::Failed {
            self.metrics.record_attestation_failure();
        }
    }

    fn fail(&mut self) {
        self.tracker.set_status(AttestStatus::Failed);
        self.metrics.record_attestation_failure();
    }
}
