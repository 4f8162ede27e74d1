//! HTTP client for organ service communication
//!
//! Every call carries the configured per-call timeout. There are no retries:
//! a timeout is final for the request that hit it.

use crate::registry::OrganEndpoint;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use vitals_common::{ApiError, ErrorBody, Organ, OrganHealth};

/// Why a call to an organ service failed
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("{organ} did not respond within {timeout_ms} ms")]
    Timeout { organ: Organ, timeout_ms: u64 },

    #[error("{organ} is unreachable: {reason}")]
    Offline { organ: Organ, reason: String },

    /// The organ answered with a non-success status
    #[error("{organ} returned HTTP {status}")]
    Rejected {
        organ: Organ,
        status: u16,
        body: Value,
    },

    #[error("{organ} sent an unreadable response: {reason}")]
    Decode { organ: Organ, reason: String },

    #[error("{organ} request task failed")]
    TaskFailed { organ: Organ },

    #[error("Cannot build request URL for {organ}: {reason}")]
    InvalidUrl { organ: Organ, reason: String },
}

impl ClientError {
    pub fn organ(&self) -> Organ {
        match self {
            Self::Timeout { organ, .. }
            | Self::Offline { organ, .. }
            | Self::Rejected { organ, .. }
            | Self::Decode { organ, .. }
            | Self::TaskFailed { organ }
            | Self::InvalidUrl { organ, .. } => *organ,
        }
    }

    /// Timed out or never connected
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Offline { .. })
    }

    /// Map to the shared taxonomy
    ///
    /// A rejection carrying a well-formed error body keeps the organ's kind;
    /// anything else the organ sent back counts as internal.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Timeout { .. } | Self::Offline { .. } => ApiError::Unreachable(self.to_string()),
            Self::Rejected { body, .. } => serde_json::from_value::<ErrorBody>(body.clone())
                .map(ApiError::from)
                .unwrap_or_else(|_| ApiError::Internal(self.to_string())),
            Self::Decode { .. } | Self::TaskFailed { .. } | Self::InvalidUrl { .. } => {
                ApiError::Internal(self.to_string())
            }
        }
    }

    /// Per-organ error entry inside an aggregate response
    pub fn marker(&self) -> Value {
        let mut marker = json!(self.to_api_error().to_body());
        if let Self::Rejected { status, .. } = self {
            marker["status_code"] = json!(status);
        }
        marker
    }
}

/// Client for the organ services
#[derive(Debug, Clone)]
pub struct OrganClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl OrganClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify a transport error
    fn classify_error(&self, organ: Organ, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                organ,
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClientError::Offline {
                organ,
                reason: err.to_string(),
            }
        }
    }

    async fn send(&self, organ: Organ, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.classify_error(organ, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(organ, e))?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                json!({ "error": String::from_utf8_lossy(&bytes).into_owned() })
            });
            debug!("{} answered {}", organ, status);
            return Err(ClientError::Rejected {
                organ,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            organ,
            reason: e.to_string(),
        })
    }

    /// `GET /health`
    pub async fn health(&self, endpoint: &OrganEndpoint) -> Result<OrganHealth, ClientError> {
        let body = self
            .send(endpoint.organ, self.client.get(endpoint.health_url()))
            .await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode {
            organ: endpoint.organ,
            reason: e.to_string(),
        })
    }

    /// `GET /api/<organ>/status`
    pub async fn status(&self, endpoint: &OrganEndpoint) -> Result<Value, ClientError> {
        debug!("Getting status from {}", endpoint.organ);
        self.send(endpoint.organ, self.client.get(endpoint.api_url("/status")))
            .await
    }

    /// `GET /api/<organ>/data?count=N`
    pub async fn data(&self, endpoint: &OrganEndpoint, count: usize) -> Result<Value, ClientError> {
        let request = self
            .client
            .get(endpoint.api_url("/data"))
            .query(&[("count", count)]);
        self.send(endpoint.organ, request).await
    }

    /// `POST /api/<organ>/simulate/<condition>`
    ///
    /// The condition always travels as a single path segment.
    pub async fn simulate(
        &self,
        endpoint: &OrganEndpoint,
        condition: &str,
    ) -> Result<Value, ClientError> {
        debug!("Simulating {} on {}", condition, endpoint.organ);
        let url = endpoint
            .api_url_with_segment("/simulate", condition)
            .map_err(|reason| ClientError::InvalidUrl {
                organ: endpoint.organ,
                reason,
            })?;
        self.send(endpoint.organ, self.client.post(url)).await
    }

    /// `POST /api/<organ>/parameters`
    pub async fn update_parameters(
        &self,
        endpoint: &OrganEndpoint,
        params: &Value,
    ) -> Result<Value, ClientError> {
        let request = self
            .client
            .post(endpoint.api_url("/parameters"))
            .json(params);
        self.send(endpoint.organ, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_marker() {
        let err = ClientError::Timeout {
            organ: Organ::Cardiac,
            timeout_ms: 5000,
        };
        assert!(err.is_unreachable());

        let marker = err.marker();
        assert_eq!(marker["kind"], "unreachable");
        assert_eq!(marker["error"], "cardiac did not respond within 5000 ms");
    }

    #[test]
    fn test_rejection_keeps_organ_error_kind() {
        let err = ClientError::Rejected {
            organ: Organ::Neural,
            status: 404,
            body: json!({
                "error": "Unknown condition 'x' for neural",
                "kind": "not_found",
                "valid_values": ["normal", "stress"],
            }),
        };
        assert!(!err.is_unreachable());
        assert!(matches!(err.to_api_error(), ApiError::NotFound { .. }));

        let marker = err.marker();
        assert_eq!(marker["kind"], "not_found");
        assert_eq!(marker["status_code"], 404);
        assert_eq!(marker["valid_values"][1], "stress");
    }

    #[test]
    fn test_rejection_with_foreign_body_is_internal() {
        let err = ClientError::Rejected {
            organ: Organ::Respiratory,
            status: 503,
            body: json!({"error": "maintenance"}),
        };
        assert!(matches!(err.to_api_error(), ApiError::Internal(_)));
        assert_eq!(err.marker()["status_code"], 503);
    }

    #[tokio::test]
    async fn test_connection_refused_is_offline() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OrganClient::new(Duration::from_secs(2)).unwrap();
        let endpoint = OrganEndpoint::new(Organ::Cardiac, format!("http://{}", addr));
        let err = client.status(&endpoint).await.unwrap_err();

        assert!(matches!(err, ClientError::Offline { .. }));
        assert_eq!(err.organ(), Organ::Cardiac);
    }
}
