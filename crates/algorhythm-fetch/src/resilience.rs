//! Request pacing and retry policy for remote providers.

use std::sync::Arc;

use backon::ExponentialBuilder;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

/// Per-source rate limiter.
///
/// Serialises requests through a single-permit [`Semaphore`] and holds the
/// permit for a fixed interval, so at most `requests_per_second` requests
/// start each second across all clones.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// A zero rate is treated as one request per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval: Duration::from_millis(1000 / u64::from(requests_per_second.max(1))),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for a request slot, then holds it for the configured interval.
    pub async fn acquire(&self) {
        // The semaphore is never closed; a failed acquire only skips the wait.
        if let Ok(_permit) = self.semaphore.acquire().await {
            sleep(self.interval).await;
        }
    }
}

/// Exponential backoff used for transient feature-service failures.
pub fn retry_policy(max_retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(max_retries)
}
