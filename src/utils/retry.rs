use anyhow::Result;
use log::{debug, info, warn};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    fn next_delay(&self, delay: Duration) -> Duration {
        let scaled = Duration::from_millis((delay.as_millis() as f64 * self.backoff_multiplier) as u64);
        scaled.min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or
/// `max_attempts` is exhausted.
pub async fn retry_with_exponential_backoff<T, F, Fut>(config: &RetryConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>> + Send,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("Operation succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= config.max_attempts => {
                warn!("Operation failed after {} attempts: {}", attempt, e);
                return Err(e.context(format!("Failed after {} attempts", attempt)));
            }
            Err(e) if is_transient_error(&e) => {
                debug!("Attempt {} failed transiently, retrying in {:?}: {}", attempt, delay, e);
                tokio::time::sleep(delay).await;
                delay = config.next_delay(delay);
                attempt += 1;
            }
            Err(e) => {
                debug!("Attempt {} failed with non-transient error, not retrying: {}", attempt, e);
                return Err(e);
            }
        }
    }
}

pub fn is_transient_error(error: &anyhow::Error) -> bool {
    if let Some(http) = error.downcast_ref::<reqwest::Error>() {
        if http.is_timeout() || http.is_connect() {
            return true;
        }
        if let Some(status) = http.status() {
            return status.as_u16() == 429 || status.is_server_error();
        }
    }

    let error_str = error.to_string().to_lowercase();
    [
        "timeout",
        "timed out",
        "connection",
        "temporar",
        "rate limit",
        "too many requests",
        "service unavailable",
        "bad gateway",
        "429",
        "502",
        "503",
        "504",
    ]
    .iter()
    .any(|needle| error_str.contains(needle))
}
