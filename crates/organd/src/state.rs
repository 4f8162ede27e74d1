//! Per-process simulation state

use crate::simulator::OrganModel;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use vitals_common::DEFAULT_MAX_SAMPLES;

/// State shared across the handlers of one organ service
pub struct OrganState<M: OrganModel> {
    pub model: RwLock<M>,
    pub start_time: Instant,
    /// Upper bound for `GET data?count=N`
    pub max_samples: usize,
}

pub type SharedState<M> = Arc<OrganState<M>>;

impl<M: OrganModel> OrganState<M> {
    pub fn new(max_samples: usize) -> Self {
        Self::with_model(M::default(), max_samples)
    }

    pub fn with_model(model: M, max_samples: usize) -> Self {
        Self {
            model: RwLock::new(model),
            start_time: Instant::now(),
            max_samples,
        }
    }

    pub fn shared(self) -> SharedState<M> {
        Arc::new(self)
    }
}

impl<M: OrganModel> Default for OrganState<M> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}
