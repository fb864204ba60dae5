//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use axon_config::{BackendConfig, Config, RateLimitConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at the given mock backend
    pub fn new(backend_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                backend: BackendConfig {
                    base_url: backend_url.parse().expect("valid URL"),
                    api_key: None,
                    models: vec!["test-model".to_owned()],
                },
                tools: axon_config::ToolsConfig::default(),
            },
        }
    }

    /// Set rate limit configuration
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.server.rate_limit = Some(config);
        self
    }

    /// Advertise a different model list
    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.config.backend.models = models.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
