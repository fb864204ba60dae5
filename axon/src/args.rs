use std::path::PathBuf;

use clap::Parser;

/// Axon gateway
#[derive(Debug, Parser)]
#[command(name = "axon", about = "OpenAI-compatible gateway with tool-calling emulation")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "axon.toml", env = "AXON_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "AXON_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
