use crate::FetchError;
use graphsnap_common::RateLimited;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Exponential backoff around a single remote call.
///
/// Semantics:
/// - the call runs once, then up to `max_retries` more times;
/// - only errors reporting [`RateLimited::is_rate_limited`] are retried;
/// - the wait starts at `initial` and doubles after every retry, with no jitter and no
///   ceiling other than the retry count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    pub max_retries: u32,
    pub initial: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial: Duration::from_secs(2),
        }
    }
}

impl Backoff {
    pub fn new(max_retries: u32, initial: Duration) -> Self {
        Self {
            max_retries,
            initial,
        }
    }

    /// Run `call` until it succeeds, fails for a non-throttling reason, or the retry
    /// budget is spent. `operation` names the call in logs and errors.
    pub async fn retry<T, E, F, Fut>(
        &self,
        operation: &str,
        mut call: F,
    ) -> Result<T, FetchError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RateLimited + std::error::Error + 'static,
    {
        let mut wait = self.initial;
        let mut attempt = 0u32;

        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_rate_limited() {
                return Err(FetchError::Failed {
                    operation: operation.to_string(),
                    source: err,
                });
            }

            if attempt >= self.max_retries {
                tracing::warn!(
                    operation,
                    max_retries = self.max_retries,
                    error = %err,
                    "backoff.exhausted"
                );
                return Err(FetchError::Exhausted {
                    operation: operation.to_string(),
                    retries: self.max_retries,
                    source: err,
                });
            }

            attempt += 1;
            tracing::warn!(
                operation,
                attempt,
                max_retries = self.max_retries,
                wait_ms = wait.as_millis() as u64,
                "retry attempt {attempt}/{} for {operation} after rate limit, waiting {wait:?}",
                self.max_retries
            );
            sleep(wait).await;
            wait = wait.saturating_mul(2);
        }
    }
}
