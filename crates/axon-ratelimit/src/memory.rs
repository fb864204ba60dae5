use std::{num::NonZeroU32, sync::Arc, time::Duration};

use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DashMapStateStore};

use crate::error::RateLimitError;

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;

/// In-memory keyed rate limiter backed by governor
#[derive(Clone)]
pub struct MemoryLimiter {
    limiter: Arc<KeyedLimiter>,
}

impl MemoryLimiter {
    /// Create a limiter allowing `max_requests` per `window`
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        if window.is_zero() {
            return Err(RateLimitError::Config("rate limit window must be > 0".to_string()));
        }

        let burst = NonZeroU32::new(max_requests)
            .ok_or_else(|| RateLimitError::Config("max_requests must be > 0".to_string()))?;

        // Governor models limits as a replenish interval plus burst capacity
        let per_second = f64::from(max_requests) / window.as_secs_f64();
        let replenish_interval = Duration::from_secs_f64(1.0 / per_second);

        let quota = Quota::with_period(replenish_interval)
            .ok_or_else(|| RateLimitError::Config("invalid rate limit period".to_string()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
        })
    }

    /// Check if a request is allowed for the given key
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let retry_after =
                    not_until.wait_time_from(governor::clock::Clock::now(&governor::clock::DefaultClock::default()));
                Err(RateLimitError::Exceeded {
                    retry_after: retry_after.as_secs().max(1),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_within_burst() {
        let limiter = MemoryLimiter::new(3, Duration::from_secs(60)).unwrap();
        for _ in 0..3 {
            limiter.check("client").unwrap();
        }
    }

    #[test]
    fn rejects_beyond_burst_with_retry_after() {
        let limiter = MemoryLimiter::new(1, Duration::from_secs(60)).unwrap();
        limiter.check("client").unwrap();
        match limiter.check("client") {
            Err(RateLimitError::Exceeded { retry_after }) => assert!(retry_after >= 1),
            other => panic!("expected Exceeded, got {other:?}"),
        }
    }

    #[test]
    fn keys_are_independent() {
        let limiter = MemoryLimiter::new(1, Duration::from_secs(60)).unwrap();
        limiter.check("a").unwrap();
        limiter.check("b").unwrap();
    }

    #[test]
    fn zero_window_is_config_error() {
        assert!(matches!(
            MemoryLimiter::new(1, Duration::ZERO),
            Err(RateLimitError::Config(_))
        ));
    }
}
