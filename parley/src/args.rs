use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Parley chat gateway
#[derive(Debug, Parser)]
#[command(name = "parley", about = "Streaming chat gateway with tool calling for local LLMs")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PARLEY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "info", env = "PARLEY_LOG")]
    pub log: String,
}
