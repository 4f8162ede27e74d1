//! HTTP client for the orchestrator API

use crate::errors::CtlError;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:5000";

/// Slightly above the orchestrator's own fan-out deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct OrchestratorClient {
    client: reqwest::Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: &str) -> Result<Self, CtlError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CtlError::Usage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/orchestration{}", self.base_url, path)
    }

    /// API URL built from `segments`, each percent-encoded as one path segment
    pub fn segment_url(&self, segments: &[&str]) -> Result<reqwest::Url, CtlError> {
        let invalid = |reason: String| {
            CtlError::Usage(format!("Invalid orchestrator URL '{}': {}", self.base_url, reason))
        };
        let mut url = reqwest::Url::parse(&self.url("")).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot take path segments".into()))?
            .extend(segments);
        Ok(url)
    }

    pub async fn get(&self, path: &str) -> Result<Value, CtlError> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn get_url(&self, url: reqwest::Url) -> Result<Value, CtlError> {
        self.send(self.client.get(url)).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, CtlError> {
        self.post_url(self.url(path), body).await
    }

    pub async fn post_url(
        &self,
        url: impl reqwest::IntoUrl,
        body: Option<&Value>,
    ) -> Result<Value, CtlError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, CtlError> {
        let response = request.send().await.map_err(|e| CtlError::Unavailable {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| CtlError::Unavailable {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        // Error statuses may come from a proxy or the router with a plain body
        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(CtlError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| CtlError::InvalidResponse(e.to_string()))
    }
}
