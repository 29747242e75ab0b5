//! Exponential-backoff policy for transient generator errors (§7).

use std::time::Duration;

/// Retry/backoff configuration for one `ChatSession`.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Maximum number of attempts against one model before giving up (or,
    /// if eligible, switching to the fallback model).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Delay never grows past this.
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Delay to sleep before the `attempt`-th retry (1-indexed: the delay
    /// before the first retry is `attempt == 1`), doubling each time and
    /// honoring a backend-suggested delay when one was provided, capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(suggested) = retry_after {
            return suggested.min(self.max_delay);
        }
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}
