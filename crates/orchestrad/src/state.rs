//! Shared orchestrator state

use crate::client::OrganClient;
use crate::config::Config;
use crate::registry::OrganRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything handlers need; immutable after startup
pub struct AppState {
    pub registry: OrganRegistry,
    pub client: OrganClient,
    /// Overall bound on a fan-out
    pub deadline: Duration,
    pub max_samples: usize,
    pub start_time: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(registry: OrganRegistry, client: OrganClient, deadline: Duration, max_samples: usize) -> Self {
        Self {
            registry,
            client,
            deadline,
            max_samples,
            start_time: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::new(
            OrganRegistry::from_config(&config.organs),
            OrganClient::new(config.timeout())?,
            config.deadline(),
            config.service.max_samples,
        ))
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
