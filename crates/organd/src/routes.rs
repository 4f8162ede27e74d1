//! API routes for an organ service
//!
//! Handlers are generic over the organ model; the same router serves the
//! cardiac, respiratory and neural processes under `/api/<organ>/...`.

use crate::simulator::OrganModel;
use crate::state::SharedState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    routing::get,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use vitals_common::{
    available_parameters, now_rfc3339, ApiError, ConditionSet, DataQuery, Organ, OrganHealth,
    ParameterUpdate,
};

// ============================================================================
// Response bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse<C, P, S> {
    pub organ: Organ,
    pub label: &'static str,
    pub status: &'static str,
    pub condition: C,
    pub parameters: P,
    pub current_data: S,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<C, S> {
    pub organ: Organ,
    pub label: &'static str,
    pub condition: C,
    pub count: usize,
    pub data: Vec<S>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse<C, S> {
    pub message: String,
    pub organ: Organ,
    pub condition: C,
    pub current_data: S,
}

/// Parameters plus the active condition
#[derive(Debug, Serialize)]
pub struct CurrentParameters<P, C> {
    #[serde(flatten)]
    pub parameters: P,
    pub condition: C,
}

#[derive(Debug, Serialize)]
pub struct ParametersResponse<P, C> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub current_parameters: CurrentParameters<P, C>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_parameters: Option<Value>,
}

type ParamsView<M> =
    ParametersResponse<<M as OrganModel>::Parameters, <M as OrganModel>::Condition>;

// ============================================================================
// Router
// ============================================================================

/// All routes of the organ service for model `M`
pub fn organ_routes<M: OrganModel>() -> Router<SharedState<M>> {
    let prefix = M::ORGAN.api_prefix();

    Router::new()
        .route("/", get(index::<M>))
        .route("/health", get(health::<M>))
        .route(&format!("{}/status", prefix), get(get_status::<M>))
        .route(&format!("{}/data", prefix), get(get_data::<M>))
        .route(
            &format!("{}/simulate/:condition", prefix),
            post(simulate::<M>),
        )
        .route(
            &format!("{}/parameters", prefix),
            get(get_parameters::<M>).post(update_parameters::<M>),
        )
        .fallback(not_found)
}

async fn index<M: OrganModel>() -> Json<Value> {
    let organ = M::ORGAN;
    let prefix = organ.api_prefix();

    Json(json!({
        "api": format!("{} API", organ.display_name()),
        "version": env!("CARGO_PKG_VERSION"),
        "organ": organ,
        "endpoints": {
            "health": "/health",
            "status": format!("{}/status", prefix),
            "data": format!("{}/data?count=N", prefix),
            "simulate": format!("{}/simulate/<condition>", prefix),
            "parameters": format!("{}/parameters", prefix),
        },
        "conditions": organ.condition_names(),
    }))
}

async fn health<M: OrganModel>(State(state): State<SharedState<M>>) -> Json<OrganHealth> {
    Json(OrganHealth {
        status: "healthy".to_string(),
        organ: M::ORGAN,
        timestamp: now_rfc3339(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn get_status<M: OrganModel>(
    State(state): State<SharedState<M>>,
) -> Json<StatusResponse<M::Condition, M::Parameters, M::Sample>> {
    let model = state.model.read().await;
    let current_data = model.sample(&mut rand::thread_rng());

    Json(StatusResponse {
        organ: M::ORGAN,
        label: M::ORGAN.body_label(),
        status: "operational",
        condition: model.condition(),
        parameters: model.parameters(),
        current_data,
    })
}

async fn get_data<M: OrganModel>(
    State(state): State<SharedState<M>>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Json<DataResponse<M::Condition, M::Sample>>, ApiError> {
    let Query(query) = query?;
    let count = query.count(state.max_samples).map_err(|e| {
        warn!("Rejected data request for {}: {}", M::ORGAN, e);
        e
    })?;

    let model = state.model.read().await;
    let data = model.samples(&mut rand::thread_rng(), count);
    debug!("Generated {} {} samples", data.len(), M::ORGAN);

    Ok(Json(DataResponse {
        organ: M::ORGAN,
        label: M::ORGAN.body_label(),
        condition: model.condition(),
        count: data.len(),
        data,
    }))
}

async fn simulate<M: OrganModel>(
    State(state): State<SharedState<M>>,
    Path(name): Path<String>,
) -> Result<Json<SimulateResponse<M::Condition, M::Sample>>, ApiError> {
    let condition = M::Condition::parse_for(M::ORGAN, &name).map_err(|e| {
        warn!("Rejected simulate request for {}: {}", M::ORGAN, e);
        e
    })?;

    let mut model = state.model.write().await;
    let previous = model.condition();
    model.set_condition(condition);
    let current_data = model.sample(&mut rand::thread_rng());

    info!(
        "{} condition: {} -> {}",
        M::ORGAN,
        previous.as_str(),
        condition.as_str()
    );

    Ok(Json(SimulateResponse {
        message: format!("Condition '{}' activated", condition.as_str()),
        organ: M::ORGAN,
        condition,
        current_data,
    }))
}

async fn get_parameters<M: OrganModel>(State(state): State<SharedState<M>>) -> Json<ParamsView<M>> {
    let model = state.model.read().await;

    Json(ParametersResponse {
        message: None,
        current_parameters: CurrentParameters {
            parameters: model.parameters(),
            condition: model.condition(),
        },
        available_parameters: Some(available_parameters(M::ORGAN)),
    })
}

async fn update_parameters<M: OrganModel>(
    State(state): State<SharedState<M>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ParamsView<M>>, ApiError> {
    let Json(body) = body?;
    let update = ParameterUpdate::from_json(M::ORGAN, &body).map_err(|e| {
        warn!("Rejected parameter update for {}: {}", M::ORGAN, e);
        e
    })?;

    let mut model = state.model.write().await;
    model.apply_update(&update);
    info!("{} parameters updated: {:?}", M::ORGAN, update);

    Ok(Json(ParametersResponse {
        message: Some("Parameters updated".to_string()),
        current_parameters: CurrentParameters {
            parameters: model.parameters(),
            condition: model.condition(),
        },
        available_parameters: None,
    }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
