use std::time::Duration;

use axon_config::{RateLimitConfig, RequestRateLimit};

use crate::{error::RateLimitError, memory::MemoryLimiter};

/// HTTP request-level rate limiter (global and per-IP)
pub struct RequestLimiter {
    global: Option<MemoryLimiter>,
    per_ip: Option<MemoryLimiter>,
}

impl RequestLimiter {
    /// Create from configuration
    pub fn new(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        let global = config.global.as_ref().map(build_limiter).transpose()?;
        let per_ip = config.per_ip.as_ref().map(build_limiter).transpose()?;

        Ok(Self { global, per_ip })
    }

    /// Check the global rate limit
    pub fn check_global(&self) -> Result<(), RateLimitError> {
        if let Some(ref limiter) = self.global {
            limiter.check("global")?;
        }
        Ok(())
    }

    /// Check the per-IP rate limit
    pub fn check_ip(&self, ip: &str) -> Result<(), RateLimitError> {
        if let Some(ref limiter) = self.per_ip {
            limiter.check(ip)?;
        }
        Ok(())
    }
}

fn build_limiter(rate_limit: &RequestRateLimit) -> Result<MemoryLimiter, RateLimitError> {
    MemoryLimiter::new(rate_limit.requests, parse_window(&rate_limit.window)?)
}

pub(crate) fn parse_window(s: &str) -> Result<Duration, RateLimitError> {
    duration_str::parse(s).map_err(|e| RateLimitError::Config(format!("invalid duration '{s}': {e}")))
}
