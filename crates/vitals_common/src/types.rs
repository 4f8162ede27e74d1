//! Wire types shared between organ services, the orchestrator and the CLI

use crate::error::ApiError;
use crate::organ::Organ;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest `count` accepted by data endpoints unless configured otherwise
pub const DEFAULT_MAX_SAMPLES: usize = 100;

/// RFC 3339 timestamp with millisecond precision
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Data queries
// ============================================================================

/// Query string of `GET .../data`
///
/// `count` stays a string so that malformed values surface as
/// `InvalidParameter` rather than a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    pub count: Option<String>,
}

impl DataQuery {
    pub fn count(&self, max: usize) -> Result<usize, ApiError> {
        parse_count(self.count.as_deref(), max)
    }
}

/// Validate a sample count: absent means 1, otherwise an integer in 1..=max
pub fn parse_count(raw: Option<&str>, max: usize) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(1);
    };

    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid(format!("count must be an integer, got '{}'", raw)))?;

    if count < 1 {
        return Err(ApiError::invalid(format!(
            "count must be at least 1, got {}",
            count
        )));
    }
    if count as u64 > max as u64 {
        return Err(ApiError::invalid(format!(
            "count must be at most {}, got {}",
            max, count
        )));
    }

    Ok(count as usize)
}

// ============================================================================
// Health
// ============================================================================

/// Body of an organ service's `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganHealth {
    pub status: String,
    pub organ: Organ,
    pub timestamp: String,
    #[serde(default)]
    pub uptime_seconds: u64,
}

/// Result of probing one organ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Answered `/health` with success
    Healthy,
    /// Answered, but with an error status or an unreadable body
    Unhealthy,
    /// Timed out or refused the connection
    Unreachable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganProbe {
    pub status: ProbeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<OrganHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

/// Aggregated health of every registered organ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: OverallStatus,
    pub timestamp: String,
    pub organs: BTreeMap<Organ, OrganProbe>,
}

impl HealthReport {
    /// Healthy iff every probe is healthy; an empty registry is degraded
    pub fn from_probes(organs: BTreeMap<Organ, OrganProbe>) -> Self {
        let all_healthy =
            !organs.is_empty() && organs.values().all(|p| p.status == ProbeStatus::Healthy);

        Self {
            overall_status: if all_healthy {
                OverallStatus::Healthy
            } else {
                OverallStatus::Degraded
            },
            timestamp: now_rfc3339(),
            organs,
        }
    }

    pub fn unreachable_organs(&self) -> Vec<Organ> {
        self.organs
            .iter()
            .filter(|(_, p)| p.status == ProbeStatus::Unreachable)
            .map(|(o, _)| *o)
            .collect()
    }
}

/// Liveness body of a service's own `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}
