//! Configuration management for orchestrad.
//!
//! Loads settings from /etc/vitals/orchestrad.toml or uses defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use vitals_common::logging::LoggingConfig;
use vitals_common::{Organ, DEFAULT_MAX_SAMPLES};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/vitals/orchestrad.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Per-call timeout for every request to an organ service
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra time a fan-out waits past `timeout_ms` before giving up
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Largest `count` forwarded to the data endpoints
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_grace_ms() -> u64 {
    250
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_ms: default_timeout_ms(),
            grace_ms: default_grace_ms(),
            max_samples: default_max_samples(),
        }
    }
}

/// Base URL of each organ service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgansConfig {
    #[serde(default = "default_cardiac_url")]
    pub cardiac: String,
    #[serde(default = "default_respiratory_url")]
    pub respiratory: String,
    #[serde(default = "default_neural_url")]
    pub neural: String,
}

fn local_url(organ: Organ) -> String {
    format!("http://localhost:{}", organ.default_port())
}

fn default_cardiac_url() -> String {
    local_url(Organ::Cardiac)
}

fn default_respiratory_url() -> String {
    local_url(Organ::Respiratory)
}

fn default_neural_url() -> String {
    local_url(Organ::Neural)
}

impl Default for OrgansConfig {
    fn default() -> Self {
        Self {
            cardiac: default_cardiac_url(),
            respiratory: default_respiratory_url(),
            neural: default_neural_url(),
        }
    }
}

impl OrgansConfig {
    pub fn url_for(&self, organ: Organ) -> &str {
        match organ {
            Organ::Cardiac => &self.cardiac,
            Organ::Respiratory => &self.respiratory,
            Organ::Neural => &self.neural,
        }
    }
}

/// Complete orchestrad configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub organs: OrgansConfig,

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

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.service.timeout_ms)
    }

    /// Upper bound on how long any fan-out may take
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.service.timeout_ms + self.service.grace_ms)
    }

    pub fn log_summary(&self) {
        info!(
            "Config: listen={} timeout={}ms grace={}ms",
            self.service.listen_addr, self.service.timeout_ms, self.service.grace_ms
        );
        for organ in Organ::ALL {
            info!("  {} -> {}", organ, self.organs.url_for(organ));
        }
        if self.service.timeout_ms == 0 {
            warn!("timeout_ms is 0, every organ call will time out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.deadline(), Duration::from_millis(5250));
        assert_eq!(config.organs.url_for(Organ::Neural), "http://localhost:5003");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [service]
            listen_addr = "127.0.0.1:7000"
            timeout_ms = 800

            [organs]
            cardiac = "http://heart.internal:9001"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.listen_addr, "127.0.0.1:7000");
        assert_eq!(config.service.grace_ms, 250);
        assert_eq!(config.deadline(), Duration::from_millis(1050));
        assert_eq!(
            config.organs.url_for(Organ::Cardiac),
            "http://heart.internal:9001"
        );
        assert_eq!(
            config.organs.url_for(Organ::Respiratory),
            "http://localhost:5002"
        );
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\ntimeout_ms = -5").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/orchestrad.toml"))).unwrap();
        assert_eq!(config.service.timeout_ms, 5000);
    }
}
