use std::time::Duration;

use attestor_types::Retries;

/// Retry budget and the delay between two attempts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: Retries,
    pub interval: Duration,
}

impl RetryPolicy {
    pub const fn new(retries: Retries, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// Retries without waiting in between.
    pub const fn immediate(retries: Retries) -> Self {
        Self::new(retries, Duration::ZERO)
    }

    pub async fn sleep(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
