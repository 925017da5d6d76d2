//! # REST API
//!
//! Builds the axum router that exposes the memory node's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path               | Description                            |
//! |--------|--------------------|----------------------------------------|
//! | GET    | `/`                | Service identification                 |
//! | GET    | `/health`          | Liveness probe                         |
//! | GET    | `/stats`           | Aggregate counters                     |
//! | POST   | `/agents/register` | Register a new agent identity          |
//! | POST   | `/agents/recover`  | Re-link a recovered identity           |
//! | POST   | `/memory/store`    | Store a new memory version (signed)    |
//! | POST   | `/memory/retrieve` | Fetch the latest version (signed)      |
//! | POST   | `/memory/history`  | List all versions (signed)             |
//! | POST   | `/memory/clear`    | Delete all versions (signed)           |
//!
//! ## Error mapping
//!
//! | Kind         | Status |
//! |--------------|--------|
//! | `Validation` | 400    |
//! | `Auth`       | 401    |
//! | `NotFound`   | 404    |
//! | `Conflict`   | 409    |
//! | `Storage`    | 500    |
//!
//! Every 401 body is exactly `{"error":"unauthorized"}` regardless of
//! which check failed — the precise cause goes to the logs, not the wire.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use claw_protocol::error::ServiceError;
use claw_protocol::service::MemoryService;
use claw_protocol::wire::{RecoverRequest, SignedRequest, StoreRequest};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The protocol service facade.
    pub service: MemoryService,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured API port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/agents/register", post(register_handler))
        .route("/agents/recover", post(recover_handler))
        .route("/memory/store", post(store_handler))
        .route("/memory/retrieve", post(retrieve_handler))
        .route("/memory/history", post(history_handler))
        .route("/memory/clear", post(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error Mapping
// ---------------------------------------------------------------------------

/// JSON error body for all non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(state: &AppState, err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match &err {
        ServiceError::Auth(cause) => {
            state.metrics.auth_failures_total.inc();
            tracing::warn!(%cause, "request rejected by authentication");
        }
        ServiceError::Storage(cause) => {
            tracing::error!(%cause, "storage failure while handling request");
        }
        other => {
            tracing::debug!(error = %other, "request rejected");
        }
    }

    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Service identification for `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub version: String,
    pub protocol_version: String,
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(RootResponse {
        service: "claw-memory".to_string(),
        version: state.version.clone(),
        protocol_version: claw_protocol::config::PROTOCOL_VERSION.to_string(),
    })
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn stats_handler(State(state): State<AppState>) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(&state, err),
    }
}

async fn register_handler(State(state): State<AppState>) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.register() {
        Ok(resp) => {
            state.metrics.agents_registered_total.inc();
            (StatusCode::CREATED, Json(resp)).into_response()
        }
        Err(err) => error_response(&state, err),
    }
}

async fn recover_handler(
    State(state): State<AppState>,
    Json(req): Json<RecoverRequest>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.recover(&req) {
        Ok(resp) => {
            state.metrics.identities_recovered_total.inc();
            Json(resp).into_response()
        }
        Err(err) => error_response(&state, err),
    }
}

async fn store_handler(State(state): State<AppState>, Json(req): Json<StoreRequest>) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.store(&req) {
        Ok(resp) => {
            state.metrics.memories_stored_total.inc();
            (StatusCode::CREATED, Json(resp)).into_response()
        }
        Err(err) => error_response(&state, err),
    }
}

async fn retrieve_handler(
    State(state): State<AppState>,
    Json(req): Json<SignedRequest>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.retrieve(&req) {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => error_response(&state, err),
    }
}

async fn history_handler(
    State(state): State<AppState>,
    Json(req): Json<SignedRequest>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.history(&req) {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => error_response(&state, err),
    }
}

async fn clear_handler(State(state): State<AppState>, Json(req): Json<SignedRequest>) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    match state.service.clear(&req) {
        Ok(resp) => {
            state.metrics.memories_cleared_total.inc();
            Json(resp).into_response()
        }
        Err(err) => error_response(&state, err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
