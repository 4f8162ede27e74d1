//! Error codes and exit status for vitalsctl

use serde_json::Value;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors, including error responses
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the orchestrator sends something that is not JSON
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when the orchestrator is unavailable/unreachable
pub const EXIT_ORCHESTRATOR_UNAVAILABLE: i32 = 70;

#[derive(Debug, thiserror::Error)]
pub enum CtlError {
    #[error("Cannot reach orchestrator at {url}: {reason}")]
    Unavailable { url: String, reason: String },

    /// The orchestrator answered with an error status
    #[error("Orchestrator returned HTTP {status}: {}", error_message(.body))]
    Api { status: u16, body: Value },

    #[error("Invalid response from orchestrator: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Usage(String),
}

impl CtlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unavailable { .. } => EXIT_ORCHESTRATOR_UNAVAILABLE,
            Self::InvalidResponse(_) => EXIT_INVALID_RESPONSE,
            Self::Api { .. } | Self::Usage(_) => EXIT_GENERAL_ERROR,
        }
    }
}

fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .or_else(|| body.as_str())
        .map(String::from)
        .unwrap_or_else(|| body.to_string())
}
