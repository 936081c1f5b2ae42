use crate::error::ApiError;
use configuration::PriceSourceConfig;
use std::future::Future;
use std::time::Duration;

/// Timeout and retry budget applied to every outbound request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl From<&PriceSourceConfig> for RetryPolicy {
    fn from(config: &PriceSourceConfig) -> Self {
        Self {
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff: config.retry_backoff,
        }
    }
}

impl RetryPolicy {
    /// Runs `call` under the timeout, repeating it after a retryable failure
    /// until the retry budget is spent. Terminal failures return immediately.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(self.timeout)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %e,
                        "Request failed, retrying in {:?}.",
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    tracing::error!(operation, attempt, error = %e, "Request failed.");
                    return Err(e);
                }
            }
        }
    }
}
