//! Bounded retry policy for the shared API endpoints.

use std::time::Duration;

/// Default wait applied to a 429 response that carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Exponential-backoff retry parameters.
///
/// Attempts are zero-indexed: attempt `n` waits `base_delay * 2^n` before the
/// next try. Only 429, 5xx, and transport failures are retried; other 4xx
/// responses are permanent and fail immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff unit for the exponential schedule.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Backoff for the given zero-indexed attempt, capped at five minutes so a
    /// misconfigured base delay cannot blow a run budget on a single sleep.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay = self
            .base_delay
            .saturating_mul(u32::try_from(factor).unwrap_or(u32::MAX));
        delay.min(Duration::from_secs(300))
    }

    /// Whether another retry is allowed after `attempt` failures.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
