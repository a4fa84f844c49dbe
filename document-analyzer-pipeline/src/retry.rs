//! Bounded exponential backoff for collaborator calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Retry bounds for one kind of collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first call. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds.
    pub initial_delay_ms: u64,
    /// Cap on the doubled delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted. The last error is returned on failure.
pub async fn with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: R,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < attempts && is_retryable(&e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
