//! Vitals Common - shared types for the organ services, orchestrator and CLI
//!
//! Holds the fixed organ registry, per-organ conditions and parameters, the
//! error taxonomy and the JSON schemas that cross service boundaries.

pub mod conditions;
pub mod error;
pub mod logging;
pub mod organ;
pub mod params;
pub mod types;

pub use conditions::*;
pub use error::{ApiError, ErrorBody, ErrorKind};
pub use organ::Organ;
pub use params::*;
pub use types::*;
