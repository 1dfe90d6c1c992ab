//! Retry logic for transient HTTP failures
//!
//! NCBI E-utilities and LLM endpoints occasionally answer with 429 or 5xx
//! responses, or drop connections under load. Requests are retried with
//! exponential backoff and jitter; anything classified as permanent fails
//! on the first attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

/// Classification of errors for the retry layer
pub trait RetryableError {
    /// Whether another attempt could succeed
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason used in log lines
    fn retry_reason(&self) -> &str;
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Backoff is capped here
    pub max_delay: Duration,
    /// Randomize each delay to between 50% and 100% of its value
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable retries entirely
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delays between attempts, in order
    pub(crate) fn delays(&self) -> Vec<Duration> {
        let base_millis = self.initial_delay.as_millis().max(1) as u64;
        let use_jitter = self.use_jitter;

        // ExponentialBackoff multiplies `base` by itself, so start from 2ms
        // and scale with the factor to get initial, 2x, 4x, ...
        ExponentialBackoff::from_millis(2)
            .factor(base_millis / 2 + base_millis % 2)
            .max_delay(self.max_delay)
            .take(self.max_retries)
            .map(|delay| {
                if use_jitter {
                    delay.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
                } else {
                    delay
                }
            })
            .collect()
    }
}

/// Run `operation`, retrying it while it fails with a retryable error
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0usize;

    RetryIf::spawn(
        config.delays(),
        || {
            attempt += 1;
            debug!(attempt, operation = operation_name, "Attempting operation");
            operation()
        },
        |err: &E| {
            let retry = err.is_retryable();
            if retry {
                warn!(
                    operation = operation_name,
                    reason = err.retry_reason(),
                    error = %err,
                    "Transient failure, retrying"
                );
            }
            retry
        },
    )
    .await
}
