//! vitalsctl commands against a live orchestrator and organ services
//!
//! Every test serves its own organs and orchestrator on ephemeral ports.

use axum::Router;
use orchestrad::client::OrganClient;
use orchestrad::registry::{OrganEndpoint, OrganRegistry};
use orchestrad::state::AppState;
use organd::simulator::{CardiacModel, NeuralModel, OrganModel, RespiratoryModel};
use organd::state::OrganState;
use serde_json::Value;
use std::time::Duration;
use vitals_common::Organ;
use vitalsctl::cli::Commands;
use vitalsctl::client::OrchestratorClient;
use vitalsctl::commands::execute;
use vitalsctl::errors::{CtlError, EXIT_GENERAL_ERROR, EXIT_ORCHESTRATOR_UNAVAILABLE};

// ============================================================================
// Fixtures
// ============================================================================

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn serve_organ<M: OrganModel>() -> String {
    serve(organd::server::app::<M>(OrganState::<M>::default().shared())).await
}

fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Orchestrator in front of three live organs
async fn stack() -> OrchestratorClient {
    let registry = OrganRegistry::from_endpoints([
        OrganEndpoint::new(Organ::Cardiac, serve_organ::<CardiacModel>().await),
        OrganEndpoint::new(Organ::Respiratory, serve_organ::<RespiratoryModel>().await),
        OrganEndpoint::new(Organ::Neural, serve_organ::<NeuralModel>().await),
    ]);
    let timeout = Duration::from_secs(2);
    let client = OrganClient::new(timeout).unwrap();
    let state = AppState::new(registry, client, timeout + Duration::from_millis(100), 100);
    let url = serve(orchestrad::server::app(state.shared())).await;
    OrchestratorClient::new(&url).unwrap()
}

async fn status(client: &OrchestratorClient, organ: &str) -> Value {
    client.get(&format!("/status/{}", organ)).await.unwrap()
}

// ============================================================================
// Read commands
// ============================================================================

#[tokio::test]
async fn test_read_commands_succeed() {
    let client = stack().await;

    for command in [
        Commands::Health { json: false },
        Commands::Health { json: true },
        Commands::Overview,
        Commands::Organs,
        Commands::Data {
            organ: "all".into(),
            count: 3,
        },
        Commands::Data {
            organ: "neural".into(),
            count: 2,
        },
        Commands::Status {
            organ: "respiratory".into(),
        },
    ] {
        let label = format!("{:?}", command);
        assert!(execute(&client, command).await.is_ok(), "{}", label);
    }
}

#[tokio::test]
async fn test_bad_count_is_api_error() {
    let client = stack().await;
    let err = execute(
        &client,
        Commands::Data {
            organ: "all".into(),
            count: 0,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CtlError::Api { status: 400, .. }));
    assert_eq!(err.exit_code(), EXIT_GENERAL_ERROR);
}

// ============================================================================
// Write commands
// ============================================================================

#[tokio::test]
async fn test_simulate_changes_organ_condition() {
    let client = stack().await;

    execute(
        &client,
        Commands::Simulate {
            organ: "cardiac".into(),
            condition: "tachycardia".into(),
        },
    )
    .await
    .unwrap();

    assert_eq!(status(&client, "cardiac").await["condition"], "tachycardia");
}

#[tokio::test]
async fn test_simulate_condition_with_query_characters_is_rejected() {
    let client = stack().await;

    for condition in ["tachycardia?x=1", "hypertension#x", "arrhythmia/../normal"] {
        let err = execute(
            &client,
            Commands::Simulate {
                organ: "cardiac".into(),
                condition: condition.into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CtlError::Api { status: 404, .. }), "{}", condition);
    }

    assert_eq!(status(&client, "cardiac").await["condition"], "normal");
}

#[tokio::test]
async fn test_scenario_applies_every_pair() {
    let client = stack().await;

    execute(
        &client,
        Commands::Scenario {
            pairs: vec!["respiratory=asthma".into(), "neural=stress".into()],
        },
    )
    .await
    .unwrap();

    assert_eq!(status(&client, "respiratory").await["condition"], "asthma");
    assert_eq!(status(&client, "neural").await["condition"], "stress");
    assert_eq!(status(&client, "cardiac").await["condition"], "normal");
}

#[tokio::test]
async fn test_params_for_one_organ_and_all() {
    let client = stack().await;

    execute(
        &client,
        Commands::Params {
            organ: Some("neural".into()),
            age: None,
            sex: None,
            activity_level: None,
            mental_state: Some("relaxed".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        status(&client, "neural").await["parameters"]["mental_state"],
        "relaxed"
    );

    execute(
        &client,
        Commands::Params {
            organ: None,
            age: Some(61),
            sex: None,
            activity_level: None,
            mental_state: None,
        },
    )
    .await
    .unwrap();
    for organ in Organ::names() {
        assert_eq!(status(&client, organ).await["parameters"]["age"], 61, "{}", organ);
    }
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unknown_organ_exits_general_error() {
    let client = stack().await;
    let err = execute(
        &client,
        Commands::Status {
            organ: "liver".into(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CtlError::Api { status: 404, .. }));
    assert_eq!(err.exit_code(), EXIT_GENERAL_ERROR);
    assert!(err.to_string().contains("liver"));
}

#[tokio::test]
async fn test_usage_error_sends_nothing() {
    // Nothing listens here, so reaching the network would be Unavailable
    let client = OrchestratorClient::new(&dead_url()).unwrap();
    let err = execute(
        &client,
        Commands::Scenario {
            pairs: vec!["cardiac".into()],
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CtlError::Usage(_)));
}

#[tokio::test]
async fn test_orchestrator_down_exits_unavailable() {
    let client = OrchestratorClient::new(&dead_url()).unwrap();
    let err = execute(&client, Commands::Overview).await.unwrap_err();
    assert_eq!(err.exit_code(), EXIT_ORCHESTRATOR_UNAVAILABLE);
}
