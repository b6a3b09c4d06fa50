//! Rate limiting for probe launches.
//!
//! Token bucket pacing to keep large sweeps from flooding the network.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// A rate limiter for controlling how fast probes are launched.
pub struct RateLimiter {
    limiter: Arc<
        GovLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl RateLimiter {
    /// Create a new rate limiter with the given probes-per-second limit.
    ///
    /// # Panics
    /// Panics if rate is 0. Use `Option<RateLimiter>` for optional pacing.
    pub fn new(rate: u32) -> Self {
        let rate = NonZeroU32::new(rate).expect("rate must be > 0");
        let limiter = GovLimiter::direct(Quota::per_second(rate));

        Self {
            limiter: Arc::new(limiter),
        }
    }

    /// Wait (async) until the limit allows another probe.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(100);
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait() {
        let limiter = RateLimiter::new(1000);
        // Should complete quickly at a high rate
        limiter.wait().await;
    }

    #[test]
    fn test_rate_limiter_clone_shares_state() {
        let limiter1 = RateLimiter::new(100);
        let limiter2 = limiter1.clone();

        assert!(limiter1.try_acquire());
        let _ = limiter2.try_acquire();
    }
}
