//! # Retry Policy
//!
//! Exponential backoff for calls to the ThousandEyes API.
//!
//! The delay before attempt `n + 1` is `base_delay * multiplier^(n - 1)`, capped at
//! `max_delay`. With the defaults (5 attempts, 2s base, x2, 10s cap) the waits are
//! 2s, 4s, 8s and 10s.
//!
//! Only errors returned by the operation are retried. An HTTP response with a
//! non-success status is a value, not an error, and ends the retry loop.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use thousandeyes_sync::controller::retry::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.delay_after(1), Duration::from_secs(2));
//! assert_eq!(policy.delay_after(2), Duration::from_secs(4));
//! assert_eq!(policy.delay_after(4), Duration::from_secs(10));
//! ```

use crate::constants::{
    DEFAULT_RETRY_BASE_DELAY_SECS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY_SECS,
    DEFAULT_RETRY_MULTIPLIER,
};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    max_attempts: u32,
    base_delay: Duration,
    multiplier: u32,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRY_MAX_ATTEMPTS,
            Duration::from_secs(DEFAULT_RETRY_BASE_DELAY_SECS),
            DEFAULT_RETRY_MULTIPLIER,
            Duration::from_secs(DEFAULT_RETRY_MAX_DELAY_SECS),
        )
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is raised to at least 1
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: u32, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait between failed attempt `attempt` (1-based) and the next one
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Every wait the policy can perform, in order
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_after(attempt))
    }

    /// Run `operation` until it returns `Ok` or the attempts are used up
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn retry<T, E, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        "Attempt failed: {}, retrying",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
