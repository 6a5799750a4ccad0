//! Retry policy for transient transport failures

use std::{
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{debug, warn};
use ytstats_common::{Result, YtStatsError};
use ytstats_config::FetchSettings;

/// How often, and how patiently, a single request is retried.
///
/// Only errors for which `YtStatsError::is_transient` holds are retried.
/// The budget applies to one request: every page and every statistics batch
/// starts with a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Fixed pause between attempts
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 0,
        }
    }
}

impl From<&FetchSettings> for RetryPolicy {
    fn from(settings: &FetchSettings) -> Self {
        Self::new(settings.max_retries, settings.retry_delay_ms)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay_ms: u64) -> Self {
        Self {
            max_retries,
            delay_ms,
        }
    }

    /// A policy that gives up after the first failure
    pub fn no_retry() -> Self {
        Self::new(0, 0)
    }

    /// Upper bound on attempts for one request
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::from_millis(self.delay_ms).take(self.max_retries)
    }

    /// Run `action` until it succeeds, fails non-transiently, or the budget runs out.
    ///
    /// A transient error that exhausts the budget is returned with its
    /// `attempts` set to the number of attempts made.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut action: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = AtomicUsize::new(0);

        let result = RetryIf::spawn(
            self.strategy(),
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > 1 {
                    debug!(operation, attempt, "Retrying request");
                }
                action()
            },
            |error: &YtStatsError| {
                let transient = error.is_transient();
                if transient {
                    warn!(
                        operation,
                        attempt = attempts.load(Ordering::SeqCst),
                        max_attempts = self.max_attempts(),
                        "Transient failure: {}",
                        error
                    );
                }
                transient
            },
        )
        .await;

        result.map_err(|error| error.with_attempts(attempts.load(Ordering::SeqCst)))
    }
}
