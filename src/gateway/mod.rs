//! HTTP gateway (Axum) in front of the orchestrator and the fact store.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{answer_handler, fact_stats_handler, facts_handler};
pub use state::AppState;

use crate::answer::{
    ARBITER_STATUS_ERROR, ARBITER_STATUS_HEADER, ARBITER_STATUS_HEALTHY, ARBITER_STATUS_NOT_READY,
    ARBITER_STATUS_READY,
};

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/answer", post(answer_handler))
        .route("/v1/facts", get(facts_handler))
        .route("/v1/facts/stats", get(fact_stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub fact_store: &'static str,
    pub fact_backend: &'static str,
    pub llm_mode: &'static str,
    pub retrieval: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ARBITER_STATUS_HEADER,
        HeaderValue::from_static(ARBITER_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let fact_store = match &state.storage_path {
        Some(path) if path.is_dir() => ARBITER_STATUS_READY,
        Some(_) => ARBITER_STATUS_ERROR,
        None => ARBITER_STATUS_READY,
    };

    let components = ComponentStatus {
        http: ARBITER_STATUS_READY,
        fact_store,
        fact_backend: state.facts.backend_kind(),
        llm_mode: if state.llm_stub { "stub" } else { "real" },
        retrieval: if state.retrieval_configured {
            "http"
        } else {
            "none"
        },
    };

    let is_ready = components.fact_store == ARBITER_STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, ARBITER_STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ARBITER_STATUS_NOT_READY)
    };

    let mut headers = HeaderMap::new();
    headers.insert(ARBITER_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
