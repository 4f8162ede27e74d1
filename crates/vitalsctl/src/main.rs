//! Vitals Control - CLI client for the orchestrator
//!
//! Replaces hand-written curl calls against the orchestration API.

use clap::Parser;
use owo_colors::OwoColorize;
use vitalsctl::cli::Cli;
use vitalsctl::client::OrchestratorClient;
use vitalsctl::commands;
use vitalsctl::errors::EXIT_SUCCESS;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match OrchestratorClient::new(&cli.url) {
        Ok(client) => commands::execute(&client, cli.command).await,
        Err(e) => Err(e),
    };

    let code = match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}
