//! Per-operation retry with exponential backoff.
//!
//! Provider calls fail transiently (rate limits, flaky transport). Each
//! single-participant operation is retried with a fixed base delay and a
//! multiplier of 3: with defaults (3 retries, 300 ms base) the delays are
//! 300/900/2700 ms. The retries actually consumed are reported alongside
//! the result so callers can fill `OperationResult::retry_count`.

use std::time::Duration;

use crate::provider::ProviderResult;

/// Retry behavior for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Backoff multiplier applied per retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(300),
            multiplier: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }
}

/// Run `operation` with retries, returning the final result and the number
/// of retries consumed.
///
/// An operation that fails `k <= max_retries` times then succeeds reports
/// `(Ok(..), k)`; one that never succeeds reports `(Err(..), max_retries)`.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> (ProviderResult<T>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        retries,
                        "operation succeeded after retry"
                    );
                }
                return (Ok(value), retries);
            }
            Err(e) => {
                if retries >= policy.max_retries {
                    tracing::warn!(
                        operation = operation_name,
                        retries,
                        error = %e,
                        "operation failed, retry budget exhausted"
                    );
                    return (Err(e), retries);
                }
                let delay = policy.delay_for(retries);
                tracing::debug!(
                    operation = operation_name,
                    retry = retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "operation failed, backing off"
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
        }
    }
}
