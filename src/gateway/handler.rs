use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::answer::{ARBITER_STATUS_HEADER, Verification};
use crate::cache::{FactRecord, FactStats};
use crate::constants::validate_unit_interval;
use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::orchestrator::{Answer, AnswerOptions};

pub const MAX_REQUEST_TOP_K: usize = 20;
pub const DEFAULT_FACTS_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: String,
    pub answer: String,
    pub citations: Vec<String>,
    pub confidence: f64,
    pub latency_ms: u64,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        let result = answer.result;
        Self {
            id: format!("ans-{}", uuid::Uuid::new_v4().simple()),
            answer: result.answer().to_string(),
            citations: result.citations().to_vec(),
            confidence: result.confidence(),
            latency_ms: answer.latency_ms,
            from_cache: result.from_cache(),
            verification: result.verification().cloned(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FactsQuery {
    pub limit: Option<usize>,
    pub min_confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FactsResponse {
    pub facts: Vec<FactRecord>,
    pub count: usize,
    pub stats: FactStats,
}

#[instrument(skip(state, payload), fields(query_tokens = tracing::field::Empty))]
pub async fn answer_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let request: AnswerRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    let tokens = validate_answer_request(&request, state.max_query_tokens)?;
    tracing::Span::current().record("query_tokens", tokens);

    let answer = state
        .orchestrator
        .answer_with(
            &request.query,
            AnswerOptions {
                top_k_final: request.top_k,
            },
        )
        .await;

    debug!(status = %answer.status, "Answer ready");
    Ok(make_response(StatusCode::OK, answer.status.as_header_value(), AnswerResponse::from(answer)))
}

#[instrument(skip(state))]
pub async fn facts_handler(
    State(state): State<AppState>,
    params: Result<Query<FactsQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(params) = params.map_err(|e| {
        GatewayError::InvalidRequest(format!("Invalid query string: {}", e.body_text()))
    })?;
    let limit = params.limit.unwrap_or(DEFAULT_FACTS_LIMIT);
    let min_confidence = params.min_confidence.unwrap_or(0.0);
    validate_unit_interval("min_confidence", min_confidence)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    let facts = state.facts.clone();
    let (facts, stats) = tokio::task::spawn_blocking(move || {
        (facts.list(limit, min_confidence), facts.stats())
    })
    .await
    .map_err(|e| GatewayError::InternalError(format!("Fact listing task failed: {}", e)))?;

    Ok(make_response(
        StatusCode::OK,
        "OK",
        FactsResponse {
            count: facts.len(),
            facts,
            stats,
        },
    ))
}

#[instrument(skip(state))]
pub async fn fact_stats_handler(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let facts = state.facts.clone();
    let stats = tokio::task::spawn_blocking(move || facts.stats())
        .await
        .map_err(|e| GatewayError::InternalError(format!("Fact stats task failed: {}", e)))?;

    Ok(make_response(StatusCode::OK, "OK", stats))
}

/// Returns the whitespace token count of a valid request.
pub(crate) fn validate_answer_request(
    request: &AnswerRequest,
    max_query_tokens: usize,
) -> Result<usize, GatewayError> {
    let tokens = request.query.split_whitespace().count();
    if tokens == 0 {
        return Err(GatewayError::InvalidRequest(
            "`query` must not be empty".to_string(),
        ));
    }
    if tokens > max_query_tokens {
        return Err(GatewayError::InvalidRequest(format!(
            "`query` has {} tokens; the limit is {}",
            tokens, max_query_tokens
        )));
    }

    if let Some(top_k) = request.top_k
        && !(1..=MAX_REQUEST_TOP_K).contains(&top_k)
    {
        return Err(GatewayError::InvalidRequest(format!(
            "`top_k` must be between 1 and {}",
            MAX_REQUEST_TOP_K
        )));
    }

    Ok(tokens)
}

pub(crate) fn make_response<T: Serialize>(
    status: StatusCode,
    arbiter_status: &str,
    body: T,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ARBITER_STATUS_HEADER,
        HeaderValue::from_str(arbiter_status).unwrap_or(HeaderValue::from_static("error")),
    );
    (status, headers, Json(body)).into_response()
}
