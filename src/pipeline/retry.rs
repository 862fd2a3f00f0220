use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::Result;

/// Bounded retry for transport failures. Zero retries means one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub transport_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            transport_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Run `op`, retrying with doubling backoff while it fails transiently.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.transport_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            transport_retries: config.transport_retries,
            initial_backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}
