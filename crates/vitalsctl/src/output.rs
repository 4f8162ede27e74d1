//! Terminal output

use owo_colors::OwoColorize;
use serde_json::Value;
use vitals_common::{HealthReport, OverallStatus, ProbeStatus};

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn probe_label(status: ProbeStatus) -> String {
    match status {
        ProbeStatus::Healthy => "healthy".green().to_string(),
        ProbeStatus::Unhealthy => "unhealthy".yellow().to_string(),
        ProbeStatus::Unreachable => "unreachable".red().to_string(),
    }
}

/// One line per organ plus the overall verdict
pub fn print_health_summary(report: &HealthReport) {
    let overall = match report.overall_status {
        OverallStatus::Healthy => "HEALTHY".green().bold().to_string(),
        OverallStatus::Degraded => "DEGRADED".yellow().bold().to_string(),
    };
    println!("System: {}  ({})", overall, report.timestamp.dimmed());

    for (organ, probe) in &report.organs {
        let timing = probe
            .response_time_ms
            .map(|ms| format!("{} ms", ms))
            .unwrap_or_default();
        println!(
            "  {:<12} {:<22} {}",
            organ.as_str().bold(),
            probe_label(probe.status),
            timing.dimmed()
        );
        if let Some(error) = &probe.error {
            println!("               {}", error.red());
        }
    }
}
