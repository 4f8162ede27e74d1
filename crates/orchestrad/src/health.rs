//! Health aggregation across organ services
//!
//! Healthy: every organ answered `/health` with success.
//! Degraded: at least one organ is unhealthy or unreachable.
//! The report itself never fails.

use crate::client::{ClientError, OrganClient};
use crate::fanout::fan_out;
use crate::registry::{OrganEndpoint, OrganRegistry};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vitals_common::{HealthReport, OrganProbe, OverallStatus, ProbeStatus};

/// Probe one organ; failures become part of the probe
pub async fn probe(client: &OrganClient, endpoint: &OrganEndpoint) -> OrganProbe {
    let start = Instant::now();
    let result = client.health(endpoint).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(health) if health.status == "healthy" => OrganProbe {
            status: ProbeStatus::Healthy,
            response_time_ms: Some(elapsed_ms),
            error: None,
            data: Some(health),
        },
        Ok(health) => OrganProbe {
            status: ProbeStatus::Unhealthy,
            response_time_ms: Some(elapsed_ms),
            error: Some(format!("{} reports status '{}'", endpoint.organ, health.status)),
            data: Some(health),
        },
        Err(e) => {
            let mut probe = failed_probe(&e);
            if !e.is_unreachable() {
                probe.response_time_ms = Some(elapsed_ms);
            }
            probe
        }
    }
}

fn failed_probe(err: &ClientError) -> OrganProbe {
    OrganProbe {
        status: if err.is_unreachable() {
            ProbeStatus::Unreachable
        } else {
            ProbeStatus::Unhealthy
        },
        response_time_ms: None,
        error: Some(err.to_string()),
        data: None,
    }
}

/// Probe every registered organ concurrently
pub async fn check_all(
    registry: &OrganRegistry,
    client: &OrganClient,
    deadline: Duration,
) -> HealthReport {
    let results = fan_out(registry.endpoints(), deadline, |endpoint| {
        let client = client.clone();
        async move { Ok::<_, ClientError>(probe(&client, &endpoint).await) }
    })
    .await;

    let probes = results
        .into_iter()
        .map(|(organ, result)| (organ, result.unwrap_or_else(|e| failed_probe(&e))))
        .collect();

    let report = HealthReport::from_probes(probes);
    match report.overall_status {
        OverallStatus::Healthy => debug!("All {} organs healthy", report.organs.len()),
        OverallStatus::Degraded => warn!(
            "System degraded, unreachable: {:?}",
            report.unreachable_organs()
        ),
    }
    report
}
