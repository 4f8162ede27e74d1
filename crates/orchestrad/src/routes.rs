//! API routes for the orchestrator
//!
//! Aggregate endpoints fan out to every registered organ and never fail
//! because of an organ; single-organ endpoints proxy and pass organ errors
//! through with the organ's own status code.

use crate::client::ClientError;
use crate::fanout::{fan_out, merge};
use crate::health;
use crate::registry::OrganEndpoint;
use crate::state::SharedState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};
use vitals_common::{
    all_parameter_keys, keys_for_organ, now_rfc3339, ApiError, DataQuery, HealthReport, Organ,
    ServiceHealth,
};

/// Errors of a proxied single-organ call
#[derive(Debug)]
pub enum ProxyError {
    /// Rejected by the orchestrator itself
    Api(ApiError),
    /// The organ failed or refused
    Organ(ClientError),
}

impl From<ApiError> for ProxyError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<ClientError> for ProxyError {
    fn from(e: ClientError) -> Self {
        Self::Organ(e)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            Self::Api(e) => e.into_response(),
            Self::Organ(ClientError::Rejected { status, body, .. }) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(body)).into_response()
            }
            Self::Organ(e) => {
                warn!("{}", e);
                e.to_api_error().into_response()
            }
        }
    }
}

type Proxied = Result<Json<Value>, ProxyError>;

/// Parse a request body that must be a non-empty JSON object
fn non_empty_object(
    body: Result<Json<Value>, JsonRejection>,
    what: &str,
) -> Result<Map<String, Value>, ApiError> {
    let Json(body) = body?;
    match body {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => Err(ApiError::invalid(format!("No {} provided", what))),
        _ => Err(ApiError::invalid(format!("{} must be a JSON object", what))),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn orchestration_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(service_health))
        .route("/api/orchestration/health", get(get_health))
        .route("/api/orchestration/overview", get(get_overview))
        .route("/api/orchestration/organs", get(get_organs))
        .route("/api/orchestration/data/all", get(get_all_data))
        .route("/api/orchestration/data/:organ", get(get_organ_data))
        .route("/api/orchestration/status/:organ", get(get_organ_status))
        .route("/api/orchestration/simulate", post(simulate_many))
        .route(
            "/api/orchestration/simulate/:organ/:condition",
            post(simulate_one),
        )
        .route("/api/orchestration/parameters", post(update_all_parameters))
        .route(
            "/api/orchestration/parameters/:organ",
            post(update_organ_parameters),
        )
        .fallback(not_found)
}

async fn index(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "api": "Orchestration API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Aggregates and coordinates the simulated organ services",
        "available_organs": state.registry.names(),
        "endpoints": {
            "health": "/api/orchestration/health",
            "overview": "/api/orchestration/overview",
            "organs": "/api/orchestration/organs",
            "all_data": "/api/orchestration/data/all",
            "organ_data": "/api/orchestration/data/<organ>",
            "organ_status": "/api/orchestration/status/<organ>",
            "simulate": "/api/orchestration/simulate",
            "simulate_organ": "/api/orchestration/simulate/<organ>/<condition>",
            "parameters": "/api/orchestration/parameters",
            "organ_parameters": "/api/orchestration/parameters/<organ>",
        },
    }))
}

async fn service_health() -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "healthy".to_string(),
        service: "orchestrator".to_string(),
        timestamp: now_rfc3339(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

// ============================================================================
// Aggregates
// ============================================================================

async fn get_health(State(state): State<SharedState>) -> Json<HealthReport> {
    Json(health::check_all(&state.registry, &state.client, state.deadline).await)
}

async fn get_overview(State(state): State<SharedState>) -> Json<Value> {
    let statuses = fan_out(state.registry.endpoints(), state.deadline, |endpoint| {
        let client = state.client.clone();
        async move { client.status(&endpoint).await }
    });
    let health = health::check_all(&state.registry, &state.client, state.deadline);

    let (health, statuses) = tokio::join!(health, statuses);

    Json(json!({
        "timestamp": now_rfc3339(),
        "system_health": health,
        "organ_statuses": merge(statuses),
    }))
}

async fn get_organs(State(state): State<SharedState>) -> Json<Value> {
    Json(state.registry.to_json())
}

async fn get_all_data(
    State(state): State<SharedState>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let count = query.count(state.max_samples)?;

    let results = fan_out(state.registry.endpoints(), state.deadline, |endpoint| {
        let client = state.client.clone();
        async move { client.data(&endpoint, count).await }
    })
    .await;

    Ok(Json(json!({
        "timestamp": now_rfc3339(),
        "data_count": count,
        "organs": merge(results),
    })))
}

async fn simulate_many(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let requested = non_empty_object(body, "conditions")?;

    let mut simulations = Map::new();
    let mut targets: Vec<OrganEndpoint> = Vec::new();
    let mut conditions: BTreeMap<Organ, String> = BTreeMap::new();

    for (name, value) in &requested {
        let endpoint = match state.registry.lookup(name) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                simulations.insert(name.clone(), json!(e.to_body()));
                continue;
            }
        };
        let Some(condition) = value.as_str() else {
            let err = ApiError::invalid(format!("Condition for {} must be a string", name));
            simulations.insert(name.clone(), json!(err.to_body()));
            continue;
        };
        if let Err(e) = endpoint.organ.check_condition(condition) {
            simulations.insert(name.clone(), json!(e.to_body()));
            continue;
        }
        conditions.insert(endpoint.organ, condition.to_string());
        targets.push(endpoint.clone());
    }

    info!("Simulating {:?}", conditions);
    let results = fan_out(&targets, state.deadline, |endpoint| {
        let client = state.client.clone();
        let condition = conditions.get(&endpoint.organ).cloned().unwrap_or_default();
        async move { client.simulate(&endpoint, &condition).await }
    })
    .await;
    simulations.extend(merge(results));

    Ok(Json(json!({
        "timestamp": now_rfc3339(),
        "simulations": simulations,
    })))
}

async fn update_all_parameters(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let params = non_empty_object(body, "parameters")?;

    let known = all_parameter_keys();
    let mut unknown: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|k| !known.contains(k))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(ApiError::invalid_with_values(
            format!("Unknown parameter(s): {}", unknown.join(", ")),
            &known,
        ));
    }

    let mut updates = Map::new();
    let mut targets: Vec<OrganEndpoint> = Vec::new();
    let mut bodies: BTreeMap<Organ, Value> = BTreeMap::new();

    for endpoint in state.registry.endpoints() {
        let subset = keys_for_organ(endpoint.organ, &params);
        if subset.is_empty() {
            updates.insert(
                endpoint.organ.to_string(),
                json!({ "skipped": true, "message": "No applicable parameters" }),
            );
            continue;
        }
        bodies.insert(endpoint.organ, Value::Object(subset));
        targets.push(endpoint.clone());
    }

    let results = fan_out(&targets, state.deadline, |endpoint| {
        let client = state.client.clone();
        let body = bodies.get(&endpoint.organ).cloned().unwrap_or_default();
        async move { client.update_parameters(&endpoint, &body).await }
    })
    .await;
    updates.extend(merge(results));

    Ok(Json(json!({
        "timestamp": now_rfc3339(),
        "updates": updates,
    })))
}

// ============================================================================
// Single organ
// ============================================================================

async fn get_organ_data(
    State(state): State<SharedState>,
    Path(organ): Path<String>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Proxied {
    let endpoint = state.registry.lookup(&organ)?;
    let Query(query) = query.map_err(ApiError::from)?;
    let count = query.count(state.max_samples)?;
    Ok(Json(state.client.data(endpoint, count).await?))
}

async fn get_organ_status(State(state): State<SharedState>, Path(organ): Path<String>) -> Proxied {
    let endpoint = state.registry.lookup(&organ)?;
    Ok(Json(state.client.status(endpoint).await?))
}

async fn simulate_one(
    State(state): State<SharedState>,
    Path((organ, condition)): Path<(String, String)>,
) -> Proxied {
    let endpoint = state.registry.lookup(&organ)?;
    endpoint.organ.check_condition(&condition)?;
    info!("Simulating {} on {}", condition, endpoint.organ);
    Ok(Json(state.client.simulate(endpoint, &condition).await?))
}

async fn update_organ_parameters(
    State(state): State<SharedState>,
    Path(organ): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Proxied {
    let endpoint = state.registry.lookup(&organ)?;
    let Json(body) = body.map_err(ApiError::from)?;
    Ok(Json(state.client.update_parameters(endpoint, &body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_object() {
        assert!(non_empty_object(Ok(Json(json!({"cardiac": "normal"}))), "conditions").is_ok());

        let err = non_empty_object(Ok(Json(json!({}))), "conditions").unwrap_err();
        assert_eq!(err.to_string(), "No conditions provided");

        let err = non_empty_object(Ok(Json(json!(["cardiac"]))), "conditions").unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { .. }));
    }

    #[test]
    fn test_organ_rejection_passes_through() {
        let err = ProxyError::Organ(ClientError::Rejected {
            organ: Organ::Cardiac,
            status: 404,
            body: json!({"error": "Unknown condition", "kind": "not_found"}),
        });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_offline_organ_is_bad_gateway() {
        let err = ProxyError::Organ(ClientError::Offline {
            organ: Organ::Neural,
            reason: "refused".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
