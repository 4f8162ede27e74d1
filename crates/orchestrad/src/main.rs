//! Orchestrator Daemon - front door for the organ services
//!
//! Fans requests out to cardiac, respiratory and neural services with a
//! bounded timeout and merges the answers per organ.

use anyhow::Result;
use clap::Parser;
use orchestrad::config::Config;
use orchestrad::server;
use std::path::PathBuf;
use tracing::{info, warn};
use vitals_common::logging::init_tracing;

#[derive(Parser)]
#[command(name = "orchestrad")]
#[command(about = "Organ services orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: /etc/vitals/orchestrad.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 127.0.0.1:5000
    #[arg(long)]
    listen: Option<String>,

    /// Override the per-call timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(listen) = cli.listen {
        config.service.listen_addr = listen;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.service.timeout_ms = timeout_ms;
    }

    init_tracing(&config.logging.level, config.logging.format);
    info!("orchestrad v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Config not loaded, using defaults: {:#}", e);
    }
    config.log_summary();

    server::run(&config).await
}
