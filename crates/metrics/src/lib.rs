use std::sync::atomic::AtomicU64;
use std::time::{SystemTime, UNIX_EPOCH};

pub use prometheus_client::metrics::counter::Counter;
pub use prometheus_client::metrics::gauge::Gauge;

use attestor_types::{AttestInfo, BlockNumber, EpochInfo};

mod registry;
pub use registry::{export, Registry, SharedRegistry};

pub const PREFIX: &str = "validator_attestation";

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    /// The latest block number seen on the network
    pub latest_block_number: Gauge,

    /// The ID of the current epoch
    pub current_epoch_id: Gauge,

    /// The total length (in blocks) of the current epoch
    pub current_epoch_length: Gauge,

    /// The first block number of the current epoch
    pub current_epoch_starting_block_number: Gauge,

    /// The block number within the current epoch the validator attests to
    pub current_epoch_assigned_block_number: Gauge,

    /// Unix timestamp of the last attestation submission
    pub last_attestation_timestamp_seconds: Gauge,

    pub attestation_submitted_count: Counter,
    pub attestation_failure_count: Counter,
    pub attestation_confirmed_count: Counter,

    /// Operational account balance, in STRK
    pub signer_balance: Gauge<f64, AtomicU64>,
}

impl Metrics {
    /// Metrics that are not exported anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(registry: &SharedRegistry, network: &str) -> Self {
        let metrics = Self::new();

        registry.with_network(PREFIX, network, |registry| {
            registry.register(
                "starknet_latest_block_number",
                "The latest block number seen by the validator on the Starknet network",
                metrics.latest_block_number.clone(),
            );

            registry.register(
                "current_epoch_id",
                "The ID of the current epoch the validator is participating in",
                metrics.current_epoch_id.clone(),
            );

            registry.register(
                "current_epoch_length",
                "The total length (in blocks) of the current epoch",
                metrics.current_epoch_length.clone(),
            );

            registry.register(
                "current_epoch_starting_block_number",
                "The first block number of the current epoch",
                metrics.current_epoch_starting_block_number.clone(),
            );

            registry.register(
                "current_epoch_assigned_block_number",
                "The block number within the current epoch for which the validator is assigned to attest",
                metrics.current_epoch_assigned_block_number.clone(),
            );

            registry.register(
                "last_attestation_timestamp_seconds",
                "The Unix timestamp (in seconds) of the last attestation submission",
                metrics.last_attestation_timestamp_seconds.clone(),
            );

            registry.register(
                "attestation_submitted_count",
                "The total number of attestations submitted since startup",
                metrics.attestation_submitted_count.clone(),
            );

            registry.register(
                "attestation_failure_count",
                "The total number of attestation submission failures since startup",
                metrics.attestation_failure_count.clone(),
            );

            registry.register(
                "attestation_confirmed_count",
                "The total number of attestations confirmed on the network since startup",
                metrics.attestation_confirmed_count.clone(),
            );

            registry.register(
                "signer_balance",
                "Balance of the operational account, in STRK",
                metrics.signer_balance.clone(),
            );
        });

        metrics
    }

    pub fn update_latest_block_number(&self, number: BlockNumber) {
        self.latest_block_number.set(as_i64(number.as_u64()));
    }

    pub fn update_epoch_info(&self, epoch: &EpochInfo, attest: &AttestInfo) {
        self.current_epoch_id.set(as_i64(epoch.epoch_id));
        self.current_epoch_length.set(as_i64(epoch.epoch_len));
        self.current_epoch_starting_block_number
            .set(as_i64(epoch.starting_block.as_u64()));
        self.current_epoch_assigned_block_number
            .set(as_i64(attest.target_block.as_u64()));
    }

    pub fn record_attestation_submitted(&self) {
        self.attestation_submitted_count.inc();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.last_attestation_timestamp_seconds.set(as_i64(now));
    }

    pub fn record_attestation_failure(&self) {
        self.attestation_failure_count.inc();
    }

    pub fn record_attestation_confirmed(&self) {
        self.attestation_confirmed_count.inc();
    }

    pub fn update_signer_balance(&self, strk: f64) {
        self.signer_balance.set(strk);
    }
}

fn as_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
