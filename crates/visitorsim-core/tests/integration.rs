//! Integration tests for visitorsim-core.
//!
//! Each test starts a stub backend (axum) on an ephemeral port and drives the
//! real HTTP client and executor against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use visitorsim_core::{
    Action, ApiError, ClientConfig, DashboardState, HttpApi, RequestKind, ResultRow, RunParams,
    ScenarioId, SimulationApi, dispatch,
};

#[derive(Default)]
struct Backend {
    calls: Mutex<Vec<String>>,
    fail_results: bool,
    malformed_scenarios: bool,
    slow_settings: bool,
}

impl Backend {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

async fn handle_scenarios(State(b): State<Arc<Backend>>) -> impl IntoResponse {
    b.record("GET /scenarios".into());
    if b.malformed_scenarios {
        return (StatusCode::OK, "{\"not\": \"a list\"}").into_response();
    }
    Json(serde_json::json!([1, 2, "5"])).into_response()
}

async fn handle_results(
    State(b): State<Arc<Backend>>,
    Path(scenario): Path<i64>,
) -> impl IntoResponse {
    b.record(format!("GET /getResults/{scenario}"));
    if b.fail_results {
        return (StatusCode::INTERNAL_SERVER_ERROR, "db down").into_response();
    }
    Json(serde_json::json!([
        {"scenario_number": scenario, "sim_year": 1440, "cust_served": 30, "cust_refused": 2, "terminals": 10},
        {"scenario_number": scenario, "sim_year": 2880, "cust_served": 61, "cust_refused": 5, "terminals": 10},
    ]))
    .into_response()
}

async fn handle_settings(State(b): State<Arc<Backend>>) -> impl IntoResponse {
    b.record("GET /settings".into());
    if b.slow_settings {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    Json(serde_json::json!({
        "scenarioNumber": 2,
        "paceOfVisitors": 0.4,
        "terminalQuantity": 8,
    }))
}

async fn handle_start(
    State(b): State<Arc<Backend>>,
    Form(params): Form<HashMap<String, String>>,
) -> String {
    b.record(format!(
        "POST /start terminals={} visitors={} scenario={}",
        params.get("terminals").map(String::as_str).unwrap_or("?"),
        params.get("visitors").map(String::as_str).unwrap_or("?"),
        params.get("scenario").map(String::as_str).unwrap_or("?"),
    ));
    "Model started".to_string()
}

/// Serve the stub and return a client pointed at it.
async fn start_backend(backend: Backend, timeout: Duration) -> (Arc<Backend>, HttpApi) {
    let backend = Arc::new(backend);
    let api = Router::new()
        .route("/scenarios", get(handle_scenarios))
        .route("/getResults/{scenario}", get(handle_results))
        .route("/settings", get(handle_settings))
        .route("/start", post(handle_start))
        .with_state(Arc::clone(&backend));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpApi::new(&ClientConfig {
        base_url: format!("http://{addr}/api"),
        timeout,
    })
    .unwrap();
    (backend, client)
}

#[tokio::test]
async fn lists_scenarios_in_backend_order() {
    let (_, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    let ids = api.list_scenarios().await.unwrap();
    assert_eq!(ids, vec![ScenarioId(1), ScenarioId(2), ScenarioId(5)]);
}

#[tokio::test]
async fn fetches_results_for_requested_scenario() {
    let (backend, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    let rows = api.get_results(ScenarioId(7)).await.unwrap();
    assert_eq!(backend.calls(), vec!["GET /getResults/7".to_string()]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].elapsed_days(), Some(2.0));
    assert_eq!(rows[0].scenario_number, Some(7));
}

#[tokio::test]
async fn fetches_negative_scenario_ids() {
    let (backend, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    api.get_results(ScenarioId(-1)).await.unwrap();
    assert_eq!(backend.calls(), vec!["GET /getResults/-1".to_string()]);
}

#[tokio::test]
async fn fetches_settings() {
    let (_, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    let s = api.get_settings().await.unwrap();
    assert_eq!(s.scenario_number, ScenarioId(2));
    assert_eq!(s.pace_of_visitors, 0.4);
    assert_eq!(s.terminal_quantity, 8);
}

#[tokio::test]
async fn start_posts_form_fields_and_returns_text() {
    let (backend, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    let ack = api
        .start_run(RunParams {
            terminals: 12,
            visitors: 0.75,
            scenario: ScenarioId(3),
        })
        .await
        .unwrap();
    assert_eq!(ack.message, "Model started");
    assert_eq!(
        backend.calls(),
        vec!["POST /start terminals=12 visitors=0.75 scenario=3".to_string()]
    );
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let backend = Backend {
        fail_results: true,
        ..Backend::default()
    };
    let (_, api) = start_backend(backend, Duration::from_secs(5)).await;
    match api.get_results(ScenarioId(1)).await {
        Err(ApiError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "db down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let backend = Backend {
        malformed_scenarios: true,
        ..Backend::default()
    };
    let (_, api) = start_backend(backend, Duration::from_secs(5)).await;
    let err = api.list_scenarios().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let backend = Backend {
        slow_settings: true,
        ..Backend::default()
    };
    let (_, api) = start_backend(backend, Duration::from_millis(200)).await;
    let err = api.get_settings().await.unwrap_err();
    assert!(err.is_timeout(), "got {err:?}");
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpApi::new(&ClientConfig {
        base_url: format!("http://{addr}/api"),
        timeout: Duration::from_secs(2),
    })
    .unwrap();
    let err = api.list_scenarios().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn run_submission_hits_backend_in_order() {
    let (backend, api) = start_backend(Backend::default(), Duration::from_secs(5)).await;
    let mut state = DashboardState::new();

    dispatch(&api, &mut state, Action::Initialize).await;
    backend.calls.lock().unwrap().clear();

    dispatch(&api, &mut state, Action::SubmitRun).await;
    assert_eq!(
        backend.calls(),
        vec![
            "POST /start terminals=8 visitors=0.4 scenario=2".to_string(),
            "GET /getResults/2".to_string(),
            "GET /scenarios".to_string(),
        ]
    );
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.items_scenario(), Some(ScenarioId(2)));
    assert_eq!(state.scenarios().len(), 3);
    assert!(state.last_error().is_none());
}

#[tokio::test]
async fn results_failure_during_run_keeps_placeholder_and_refreshes_list() {
    let backend = Backend {
        fail_results: true,
        ..Backend::default()
    };
    let (backend, api) = start_backend(backend, Duration::from_secs(5)).await;
    let mut state = DashboardState::new();

    dispatch(&api, &mut state, Action::SubmitRun).await;
    assert_eq!(backend.calls().len(), 3);
    assert_eq!(state.items(), &[ResultRow::PLACEHOLDER]);
    assert_eq!(state.scenarios().len(), 3);
    let err = state.last_error().unwrap();
    assert_eq!(
        err.source,
        visitorsim_core::ErrorSource::Request(RequestKind::Results)
    );
}
