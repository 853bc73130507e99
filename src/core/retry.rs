use std::future::Future;
use std::time::Duration;

use dlmate_core::models::settings::ClientConfig;
use dlmate_core::DlMateError;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Exponential backoff with jitter for transient upstream failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.retries,
            base_delay: config.retry_backoff(),
            max_delay: MAX_DELAY,
        }
    }

    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry `n` (1-based), without jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, DlMateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DlMateError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retry < self.max_retries => {
                    retry += 1;
                    let base = self.delay_for(retry);
                    let base_ms = base.as_millis() as u64;
                    let jitter = rand::random::<u64>() % (base_ms / 2 + 1);
                    let delay = base + Duration::from_millis(jitter);
                    tracing::warn!(
                        "[{}] attempt {}/{} failed: {}, retrying in {}ms",
                        label,
                        retry,
                        self.max_retries + 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
