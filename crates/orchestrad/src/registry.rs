//! Static registry of organ services

use crate::config::OrgansConfig;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use vitals_common::{ApiError, Organ};

/// Where one organ service lives
#[derive(Debug, Clone, Serialize)]
pub struct OrganEndpoint {
    #[serde(skip)]
    pub organ: Organ,
    pub base_url: String,
    pub name: &'static str,
    pub health_endpoint: &'static str,
}

impl OrganEndpoint {
    pub fn new(organ: Organ, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            organ,
            base_url: base_url.trim_end_matches('/').to_string(),
            name: organ.display_name(),
            health_endpoint: "/health",
        }
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_endpoint)
    }

    /// URL of `/api/<organ><path>`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.organ.api_prefix(), path)
    }

    /// Organ route `path` followed by `segment` as one percent-encoded path
    /// segment
    pub fn api_url_with_segment(&self, path: &str, segment: &str) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.api_url(path)).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot take path segments", self.base_url))?
            .push(segment);
        Ok(url)
    }
}

/// The fixed set of organ services this orchestrator fronts
#[derive(Debug, Clone)]
pub struct OrganRegistry {
    endpoints: BTreeMap<Organ, OrganEndpoint>,
}

impl OrganRegistry {
    pub fn from_config(config: &OrgansConfig) -> Self {
        Self::from_endpoints(
            Organ::ALL
                .iter()
                .map(|o| OrganEndpoint::new(*o, config.url_for(*o))),
        )
    }

    pub fn from_endpoints(endpoints: impl IntoIterator<Item = OrganEndpoint>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(|e| (e.organ, e)).collect(),
        }
    }

    pub fn get(&self, organ: Organ) -> Option<&OrganEndpoint> {
        self.endpoints.get(&organ)
    }

    /// Resolve a path segment to a registered endpoint
    pub fn lookup(&self, name: &str) -> Result<&OrganEndpoint, ApiError> {
        let organ: Organ = name.parse()?;
        self.get(organ).ok_or_else(|| {
            ApiError::not_found_with_values(
                format!("Organ '{}' is not registered", organ),
                self.names(),
            )
        })
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &OrganEndpoint> {
        self.endpoints.values()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.endpoints.keys().map(|o| o.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Body of `GET /api/orchestration/organs`
    pub fn to_json(&self) -> Value {
        let organs: BTreeMap<Organ, &OrganEndpoint> =
            self.endpoints.iter().map(|(o, e)| (*o, e)).collect();
        json!({
            "organs": organs,
            "count": self.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_default_config() {
        let registry = OrganRegistry::from_config(&OrgansConfig::default());
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get(Organ::Respiratory).unwrap().health_url(),
            "http://localhost:5002/health"
        );
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let endpoint = OrganEndpoint::new(Organ::Neural, "http://brain:80/");
        assert_eq!(
            endpoint.api_url("/data?count=3"),
            "http://brain:80/api/neural/data?count=3"
        );
    }

    #[test]
    fn test_segment_is_percent_encoded() {
        let endpoint = OrganEndpoint::new(Organ::Cardiac, "http://heart:5001");
        let url = endpoint
            .api_url_with_segment("/simulate", "tachycardia")
            .unwrap();
        assert_eq!(url.as_str(), "http://heart:5001/api/cardiac/simulate/tachycardia");

        let url = endpoint
            .api_url_with_segment("/simulate", "arrhythmia?x=1#frag/..")
            .unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path_segments().map(|s| s.count()), Some(4));
        assert!(url.path().starts_with("/api/cardiac/simulate/arrhythmia%3Fx=1%23frag%2F"));
    }

    #[test]
    fn test_lookup_unknown_and_unregistered() {
        let registry =
            OrganRegistry::from_endpoints([OrganEndpoint::new(Organ::Cardiac, "http://x")]);

        assert!(registry.lookup("cardiac").is_ok());
        assert!(matches!(
            registry.lookup("liver"),
            Err(ApiError::NotFound { .. })
        ));

        let err = registry.lookup("neural").unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_registry_json_shape() {
        let json = OrganRegistry::from_config(&OrgansConfig::default()).to_json();
        assert_eq!(json["count"], 3);
        assert_eq!(json["organs"]["cardiac"]["base_url"], "http://localhost:5001");
        assert_eq!(json["organs"]["neural"]["health_endpoint"], "/health");
        assert!(json["organs"]["cardiac"].get("organ").is_none());
    }
}
