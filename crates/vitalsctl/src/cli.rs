//! Command-line definition

use crate::client::DEFAULT_URL;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vitalsctl")]
#[command(about = "Control the simulated organ services through the orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Orchestrator base URL
    #[arg(long, global = true, default_value = DEFAULT_URL)]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Show health of every organ service
    Health {
        /// Print the raw report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Health plus current status of every organ
    Overview,

    /// List registered organ services
    Organs,

    /// Fetch synthetic samples
    Data {
        /// Organ name, or "all"
        organ: String,

        #[arg(long, default_value_t = 1)]
        count: i64,
    },

    /// Current status of one organ
    Status { organ: String },

    /// Activate a condition on one organ
    Simulate { organ: String, condition: String },

    /// Activate conditions on several organs at once
    Scenario {
        /// Pairs like cardiac=tachycardia respiratory=asthma
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Update demographic parameters
    Params {
        /// Only update this organ (default: every organ)
        #[arg(long)]
        organ: Option<String>,

        #[arg(long)]
        age: Option<u8>,

        /// M or F
        #[arg(long)]
        sex: Option<String>,

        #[arg(long)]
        activity_level: Option<String>,

        #[arg(long)]
        mental_state: Option<String>,
    },
}
