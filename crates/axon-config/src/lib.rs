#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod rate_limit;
pub mod server;
pub mod tools;

use serde::Deserialize;

pub use backend::*;
pub use cors::*;
pub use health::*;
pub use rate_limit::*;
pub use server::*;
pub use tools::*;

/// Top-level Axon configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream text backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Tool registry configuration
    #[serde(default)]
    pub tools: ToolsConfig,
}
