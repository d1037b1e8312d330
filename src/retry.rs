//! Retry policy for API requests.

use std::time::Duration;

use crate::error::LmError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait before retrying a 429 that carries no usable `Retry-After`.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Default wait before retrying a 5xx or transport failure.
pub const DEFAULT_TRANSIENT_BACKOFF: Duration = Duration::from_secs(2);

/// Bounded, fixed-delay retry policy.
///
/// A request is attempted once and then retried at most `max_retries` times.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub rate_limit_backoff: Duration,
    pub transient_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            transient_backoff: DEFAULT_TRANSIENT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Decide whether to retry after `error` on attempt `retries_done + 1`.
    ///
    /// Returns the delay to wait first, or `None` when the error is final.
    /// A rate-limit error always yields a delay: a positive `Retry-After`
    /// from the server takes precedence, otherwise the fixed back-off applies.
    pub fn next_delay(&self, error: &LmError, retries_done: u32) -> Option<Duration> {
        if retries_done >= self.max_retries || !error.is_transient() {
            return None;
        }

        match error {
            LmError::RateLimited {
                retry_after_secs: Some(secs),
            } if *secs > 0 => Some(Duration::from_secs(*secs)),
            LmError::RateLimited { .. } => Some(self.rate_limit_backoff),
            _ => Some(self.transient_backoff),
        }
    }
}
