#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod memory;
mod monitor;
mod request;

pub use error::RateLimitError;
pub use memory::MemoryLimiter;
pub use monitor::RateLimitMonitor;
pub use request::RequestLimiter;

use axon_config::RateLimitConfig;

/// Create a request limiter from configuration
pub fn create_request_limiter(config: &RateLimitConfig) -> Result<RequestLimiter, RateLimitError> {
    RequestLimiter::new(config)
}

/// Create the backend-call monitor from configuration, if one is configured
pub fn create_backend_monitor(config: &RateLimitConfig) -> Result<Option<RateLimitMonitor>, RateLimitError> {
    config
        .backend
        .as_ref()
        .map(|limit| {
            let window = crate::request::parse_window(&limit.window)?;
            RateLimitMonitor::new(limit.requests, window)
        })
        .transpose()
}
