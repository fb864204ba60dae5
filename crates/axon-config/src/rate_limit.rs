use serde::Deserialize;

/// Rate limiting configuration
///
/// All limits are enforced in-memory; Axon runs as a single instance in
/// front of one backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Global rate limit (all requests)
    #[serde(default)]
    pub global: Option<RequestRateLimit>,
    /// Per-IP rate limit
    #[serde(default)]
    pub per_ip: Option<RequestRateLimit>,
    /// Backend-call budget watched by the read-only monitor; the chat
    /// flow consults it for utilization figures but enforcement stays in
    /// the server middleware
    #[serde(default)]
    pub backend: Option<RequestRateLimit>,
}

/// Request-based rate limit
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestRateLimit {
    /// Maximum requests per window
    pub requests: u32,
    /// Window duration (e.g. "1m", "1h")
    pub window: String,
}
