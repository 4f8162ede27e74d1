//! Command implementations

use crate::cli::Commands;
use crate::client::OrchestratorClient;
use crate::errors::CtlError;
use crate::output::{print_health_summary, print_json};
use serde_json::{Map, Value};
use vitals_common::HealthReport;

/// Turn `organ=condition` pairs into the multi-organ simulate body
pub fn parse_scenario(pairs: &[String]) -> Result<Value, CtlError> {
    let mut body = Map::new();
    for pair in pairs {
        let (organ, condition) = pair
            .split_once('=')
            .filter(|(o, c)| !o.is_empty() && !c.is_empty())
            .ok_or_else(|| {
                CtlError::Usage(format!("Expected organ=condition, got '{}'", pair))
            })?;
        body.insert(organ.to_string(), Value::String(condition.to_string()));
    }
    Ok(Value::Object(body))
}

/// Body of a parameter update from the supplied flags
pub fn build_params(
    age: Option<u8>,
    sex: Option<String>,
    activity_level: Option<String>,
    mental_state: Option<String>,
) -> Result<Value, CtlError> {
    let mut body = Map::new();
    if let Some(age) = age {
        body.insert("age".into(), age.into());
    }
    if let Some(sex) = sex {
        body.insert("sex".into(), sex.into());
    }
    if let Some(level) = activity_level {
        body.insert("activity_level".into(), level.into());
    }
    if let Some(state) = mental_state {
        body.insert("mental_state".into(), state.into());
    }

    if body.is_empty() {
        return Err(CtlError::Usage(
            "No parameters given (use --age, --sex, --activity-level or --mental-state)".into(),
        ));
    }
    Ok(Value::Object(body))
}

pub async fn execute(client: &OrchestratorClient, command: Commands) -> Result<(), CtlError> {
    let response = match command {
        Commands::Health { json } => {
            let response = client.get("/health").await?;
            if !json {
                let report: HealthReport = serde_json::from_value(response)
                    .map_err(|e| CtlError::InvalidResponse(e.to_string()))?;
                print_health_summary(&report);
                return Ok(());
            }
            response
        }
        Commands::Overview => client.get("/overview").await?,
        Commands::Organs => client.get("/organs").await?,
        Commands::Data { organ, count } => {
            let mut url = client.segment_url(&["data", &organ])?;
            url.query_pairs_mut()
                .append_pair("count", &count.to_string());
            client.get_url(url).await?
        }
        Commands::Status { organ } => {
            client
                .get_url(client.segment_url(&["status", &organ])?)
                .await?
        }
        Commands::Simulate { organ, condition } => {
            let url = client.segment_url(&["simulate", &organ, &condition])?;
            client.post_url(url, None).await?
        }
        Commands::Scenario { pairs } => {
            let body = parse_scenario(&pairs)?;
            client.post("/simulate", Some(&body)).await?
        }
        Commands::Params {
            organ,
            age,
            sex,
            activity_level,
            mental_state,
        } => {
            let body = build_params(age, sex, activity_level, mental_state)?;
            let url = match organ {
                Some(organ) => client.segment_url(&["parameters", &organ])?,
                None => client.segment_url(&["parameters"])?,
            };
            client.post_url(url, Some(&body)).await?
        }
    };

    print_json(&response);
    Ok(())
}
