use std::path::PathBuf;

use clap::Parser;

/// Tollgate prepaid LLM gateway
#[derive(Debug, Parser)]
#[command(name = "tollgate", about = "Prepaid streaming gateway for LLM chat providers")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "tollgate.toml", env = "TOLLGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "TOLLGATE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Override the configured log filter (same syntax as RUST_LOG)
    #[arg(long, env = "TOLLGATE_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Exit after loading and validating the configuration
    #[arg(long)]
    pub check_config: bool,
}
