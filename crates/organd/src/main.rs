//! Organ Daemon - simulated physiological signal service
//!
//! One process per organ. Serves status, synthetic data, condition presets
//! and demographic parameters over HTTP.

use anyhow::Result;
use clap::Parser;
use organd::config::Config;
use organd::server;
use organd::simulator::{CardiacModel, NeuralModel, RespiratoryModel};
use std::path::PathBuf;
use tracing::{info, warn};
use vitals_common::logging::init_tracing;
use vitals_common::Organ;

#[derive(Parser)]
#[command(name = "organd")]
#[command(about = "Simulated organ service", long_about = None)]
#[command(version)]
struct Cli {
    /// Organ to simulate (cardiac, respiratory, neural)
    #[arg(long, value_parser = parse_organ)]
    organ: Organ,

    /// Config file (default: /etc/vitals/organd.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

fn parse_organ(s: &str) -> Result<Organ, String> {
    s.parse::<Organ>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(port) = cli.port {
        match cli.organ {
            Organ::Cardiac => config.ports.cardiac = port,
            Organ::Respiratory => config.ports.respiratory = port,
            Organ::Neural => config.ports.neural = port,
        }
    }

    init_tracing(&config.logging.level, config.logging.format);
    info!("organd v{} starting ({})", env!("CARGO_PKG_VERSION"), cli.organ);
    if let Some(e) = load_error {
        warn!("Config not loaded, using defaults: {:#}", e);
    }
    config.log_summary(cli.organ);

    match cli.organ {
        Organ::Cardiac => server::run::<CardiacModel>(&config).await,
        Organ::Respiratory => server::run::<RespiratoryModel>(&config).await,
        Organ::Neural => server::run::<NeuralModel>(&config).await,
    }
}
