//! Retry policy for translation file loads.

use crate::error::LoadError;
use crate::i18n::LanguageCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often, and how patiently, a failed load is retried.
///
/// Only transient failures (see [`LoadError::is_transient`]) are retried.
/// The delay doubles after each retry up to `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one; never less than 1
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// One attempt, no retries.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Policy for fetching translation files: waits 500ms, 1s, 2s, then 4s
    /// between attempts.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::from_millis(500), Duration::from_secs(4))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retry number `retry` (1 for the first retry).
    fn delay_before(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `load` until it succeeds, fails permanently, or runs out of
    /// attempts. The last error is returned.
    pub async fn run<T, F, Fut>(&self, code: &LanguageCode, mut load: F) -> Result<T, LoadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
    {
        let mut attempt = 1;
        loop {
            match load().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Loaded '{}' on attempt {}/{}", code, attempt, self.max_attempts);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() || attempt >= self.max_attempts => {
                    if attempt > 1 {
                        warn!("Giving up on '{}' after {} attempts", code, attempt);
                    }
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_before(attempt);
                    warn!(
                        "Loading '{}' failed (attempt {}/{}), retrying in {:?}: {}",
                        code, attempt, self.max_attempts, delay, e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}
