//! Error taxonomy shared by every service.
//!
//! Every failure leaving a service is one of four kinds and serializes to
//! the same body: `{"error": "...", "kind": "...", "valid_values": [...]}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Machine-readable error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidParameter,
    Unreachable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidParameter => "invalid_parameter",
            Self::Unreachable => "unreachable",
            Self::Internal => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidParameter => StatusCode::BAD_REQUEST,
            Self::Unreachable => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors returned by organ services and the orchestrator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Unknown organ, condition or route
    #[error("{message}")]
    NotFound {
        message: String,
        valid_values: Vec<String>,
    },

    /// Malformed count, bad JSON, unknown parameter key or value
    #[error("{message}")]
    InvalidParameter {
        message: String,
        valid_values: Vec<String>,
    },

    /// Downstream service did not answer in time or refused the connection
    #[error("{0}")]
    Unreachable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            valid_values: Vec::new(),
        }
    }

    pub fn not_found_with_values(message: impl Into<String>, valid: Vec<&str>) -> Self {
        Self::NotFound {
            message: message.into(),
            valid_values: valid.into_iter().map(String::from).collect(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            valid_values: Vec::new(),
        }
    }

    pub fn invalid_with_values(message: impl Into<String>, valid: &[&str]) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            valid_values: valid.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::Unreachable(_) => ErrorKind::Unreachable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Wire representation, also used as the per-organ error marker
    pub fn to_body(&self) -> ErrorBody {
        let valid_values = match self {
            Self::NotFound { valid_values, .. } | Self::InvalidParameter { valid_values, .. } => {
                valid_values.clone()
            }
            _ => Vec::new(),
        };

        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            valid_values,
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,
}

impl From<ErrorBody> for ApiError {
    fn from(body: ErrorBody) -> Self {
        match body.kind {
            ErrorKind::NotFound => Self::NotFound {
                message: body.error,
                valid_values: body.valid_values,
            },
            ErrorKind::InvalidParameter => Self::InvalidParameter {
                message: body.error,
                valid_values: body.valid_values,
            },
            ErrorKind::Unreachable => Self::Unreachable(body.error),
            ErrorKind::Internal => Self::Internal(body.error),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unreachable("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_omits_empty_valid_values() {
        let json = serde_json::to_value(ApiError::invalid("bad count").to_body()).unwrap();
        assert_eq!(json["error"], "bad count");
        assert_eq!(json["kind"], "invalid_parameter");
        assert!(json.get("valid_values").is_none());
    }

    #[test]
    fn test_body_carries_valid_values() {
        let err = ApiError::not_found_with_values("Unknown condition 'x'", vec!["normal", "asthma"]);
        let body = err.to_body();
        assert_eq!(body.kind, ErrorKind::NotFound);
        assert_eq!(body.valid_values, vec!["normal", "asthma"]);
    }

    #[test]
    fn test_error_body_converts_back() {
        let original = ApiError::Unreachable("cardiac timed out".into());
        let restored = ApiError::from(original.to_body());
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn test_into_response_writes_json_body() {
        use http_body_util::BodyExt;

        let response = ApiError::invalid("count must be positive").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "count must be positive");
    }
}
