//! Axum-based tool gateway: HTTP entry point for the compliance-suite tools.
//!
//! Domain failures (unknown suite, missing artifacts, engine crashes) travel
//! in-band as `{"error": ...}` payloads with HTTP 200; only malformed
//! requests are rejected with 422 before a tool runs.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veritest_core::{
    validate_identifier, CoreConfig, LogLevel, RobotEngine, ToolError, ToolRegistry,
};
use veritest_tools::standard_registry;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[veritest-gateway] .env not loaded: {e} (using system environment)");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(CoreConfig::load().expect("load CoreConfig"));
    let engine = Arc::new(RobotEngine::new(&config.engine_command));
    let registry = Arc::new(standard_registry(&config, engine));

    tracing::info!("{} starting", config.app_name);
    for tool in registry.descriptors() {
        tracing::info!("  - {:<25} {}", tool.name, tool.description);
    }

    let state = AppState {
        config: Arc::clone(&config),
        registry,
        execution_locks: Arc::new(DashMap::new()),
    };
    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind gateway address");
    tracing::info!("veritest-gateway listening on {addr}");
    axum::serve(listener, app).await.expect("serve gateway");
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) registry: Arc<ToolRegistry>,
    /// One lock per suite name: concurrent executions of the same suite
    /// would race on its artifact directory, so they are serialized here.
    pub(crate) execution_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

fn build_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/list_tests", post(list_tests))
        .route("/tools/execute", post(execute_suite))
        .route("/tools/results", post(latest_results))
        .route("/tools/search_logs", post(search_logs))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rejection for request-shape violations, before any tool runs.
fn unprocessable(detail: impl std::fmt::Display) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "detail": detail.to_string() })),
    )
        .into_response()
}

/// Runs a registered tool and converts its outcome to the in-band wire shape.
async fn dispatch(state: &AppState, name: &str, payload: Option<serde_json::Value>) -> Response {
    let Some(tool) = state.registry.get(name) else {
        tracing::error!(tool = name, "tool missing from registry");
        return Json(serde_json::json!({ "error": "Internal error" })).into_response();
    };
    match tool.execute(payload).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            if let ToolError::Io(detail) = &e {
                tracing::error!(tool = name, %detail, "tool I/O failure");
            }
            Json(e.to_payload()).into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": state.registry.descriptors() }))
}

async fn list_tests(State(state): State<AppState>) -> Response {
    dispatch(&state, "list_available_tests", None).await
}

#[derive(Deserialize)]
struct ExecuteRequest {
    suite_name: String,
}

async fn execute_suite(State(state): State<AppState>, Json(req): Json<ExecuteRequest>) -> Response {
    if let Err(e) = validate_identifier(&req.suite_name, "suite_name", false) {
        return unprocessable(e);
    }

    let lock = state
        .execution_locks
        .entry(req.suite_name.clone())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone();
    let _guard = lock.lock().await;

    let payload = serde_json::json!({ "suite_name": req.suite_name });
    let run = dispatch(&state, "execute_test_suite", Some(payload));
    match tokio::time::timeout(state.config.execution_timeout(), run).await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(suite = %req.suite_name, "suite execution timed out");
            Json(serde_json::json!({
                "error": format!(
                    "Execution timed out after {} seconds",
                    state.config.execution_timeout_secs
                ),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
            .into_response()
        }
    }
}

#[derive(Deserialize)]
struct ResultsRequest {
    #[serde(default)]
    suite_name: Option<String>,
}

async fn latest_results(State(state): State<AppState>, Json(req): Json<ResultsRequest>) -> Response {
    if let Some(name) = req.suite_name.as_deref() {
        if !name.is_empty() {
            if let Err(e) = validate_identifier(name, "suite_name", false) {
                return unprocessable(e);
            }
        }
    }
    let payload = req
        .suite_name
        .map(|name| serde_json::json!({ "suite_name": name }));
    dispatch(&state, "get_latest_results", payload).await
}

fn default_log_level() -> String {
    LogLevel::Fail.as_str().to_string()
}

#[derive(Deserialize)]
struct SearchLogsRequest {
    keyword: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

async fn search_logs(
    State(state): State<AppState>,
    Json(req): Json<SearchLogsRequest>,
) -> Response {
    if req.keyword.contains('\0') {
        return unprocessable("keyword contains invalid characters");
    }
    if req.keyword.chars().count() > 200 {
        return unprocessable("keyword is too long (max 200 characters)");
    }
    if let Err(e) = LogLevel::parse(&req.log_level) {
        return unprocessable(e);
    }
    let payload = serde_json::json!({
        "keyword": req.keyword,
        "log_level": req.log_level,
    });
    dispatch(&state, "search_test_logs", Some(payload)).await
}
