//! Configuration management for organd.
//!
//! Loads settings from /etc/vitals/organd.toml or uses defaults. One file
//! serves all three organ processes; each picks its own port.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use vitals_common::logging::LoggingConfig;
use vitals_common::{Organ, DEFAULT_MAX_SAMPLES};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/vitals/organd.toml";

/// HTTP listener and request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Largest `count` accepted by the data endpoint
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            max_samples: default_max_samples(),
        }
    }
}

/// Port per organ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsConfig {
    #[serde(default = "default_cardiac_port")]
    pub cardiac: u16,
    #[serde(default = "default_respiratory_port")]
    pub respiratory: u16,
    #[serde(default = "default_neural_port")]
    pub neural: u16,
}

fn default_cardiac_port() -> u16 {
    Organ::Cardiac.default_port()
}

fn default_respiratory_port() -> u16 {
    Organ::Respiratory.default_port()
}

fn default_neural_port() -> u16 {
    Organ::Neural.default_port()
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            cardiac: default_cardiac_port(),
            respiratory: default_respiratory_port(),
            neural: default_neural_port(),
        }
    }
}

impl PortsConfig {
    pub fn port_for(&self, organ: Organ) -> u16 {
        match organ {
            Organ::Cardiac => self.cardiac,
            Organ::Respiratory => self.respiratory,
            Organ::Neural => self.neural,
        }
    }
}

/// Complete organd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub ports: PortsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path` (or the default path)
    ///
    /// A missing file means defaults. A file that cannot be read or parsed is
    /// an error for the caller to report once tracing is up.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_PATH));

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn listen_addr(&self, organ: Organ) -> String {
        format!("{}:{}", self.service.listen_host, self.ports.port_for(organ))
    }

    /// Log the effective settings once tracing is up
    pub fn log_summary(&self, organ: Organ) {
        info!(
            "Config: {} on {} (max_samples={})",
            organ,
            self.listen_addr(organ),
            self.service.max_samples
        );
        if self.service.max_samples == 0 {
            warn!("max_samples is 0, every data request will be rejected");
        }
    }
}
