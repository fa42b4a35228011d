use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "whisperwire")]
#[command(about = "Relays chat between a game server and a Discord channel")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Periodically log process and relay statistics
    #[arg(long)]
    pub monitor: bool,

    /// Seconds between monitor reports
    #[arg(long, default_value = "60")]
    pub monitor_interval_secs: u64,

    /// Validate configuration and print a summary without connecting
    #[arg(long)]
    pub dry_run: bool,
}
