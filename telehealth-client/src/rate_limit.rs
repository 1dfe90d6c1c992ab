//! Rate limiting for NCBI API compliance
//!
//! NCBI E-utilities allow 3 requests per second without an API key and 10
//! with one. Violations can result in IP blocking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, instrument};

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

impl RateLimiter {
    /// Create a new rate limiter allowing `rate` requests per second
    ///
    /// # Examples
    ///
    /// ```
    /// use telehealth_client::RateLimiter;
    ///
    /// let limiter_default = RateLimiter::new(3.0);
    /// let limiter_with_key = RateLimiter::new(10.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = if rate > 0.0 { rate } else { 1.0 };
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// NCBI API without API key (3 requests/second)
    pub fn ncbi_default() -> Self {
        Self::new(3.0)
    }

    /// NCBI API with API key (10 requests/second)
    pub fn ncbi_with_key() -> Self {
        Self::new(10.0)
    }

    fn lock(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a token, waiting until one is available
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> crate::Result<()> {
        loop {
            let wait = {
                let mut bucket = self.lock();
                bucket.refill();

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    debug!(remaining_tokens = %bucket.tokens, "Token acquired");
                    return Ok(());
                }

                let missing = 1.0 - bucket.tokens;
                Duration::from_secs_f64(missing / bucket.refill_rate)
            };

            debug!(wait_duration_ms = wait.as_millis(), "Waiting for rate limit");
            sleep(wait).await;
        }
    }

    /// Whether a token could be acquired right now (does not consume one)
    pub fn check_available(&self) -> bool {
        let mut bucket = self.lock();
        bucket.refill();
        bucket.tokens >= 1.0
    }

    /// Current token count (for testing and monitoring)
    pub fn token_count(&self) -> f64 {
        let mut bucket = self.lock();
        bucket.refill();
        bucket.tokens
    }

    /// Configured rate (requests per second)
    pub fn rate(&self) -> f64 {
        self.lock().refill_rate
    }
}
