//! Fixed-backoff retry budget for page fetches.

use std::time::Duration;

/// Default number of attempts per URL.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between two attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// How many times a URL is tried and how long to wait in between.
/// The backoff is fixed, not exponential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy that tries once and never sleeps.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}
