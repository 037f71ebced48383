use std::sync::Arc;

use axum::{Router, body::Body, http::Request, http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::answer::{ARBITER_STATUS_HEADER, ContextChunk};
use crate::cache::FactStore;
use crate::gateway::create_router_with_state;
use crate::gateway::error::GatewayError;
use crate::gateway::handler::{AnswerRequest, validate_answer_request};
use crate::gateway::state::AppState;
use crate::orchestrator::{Orchestrator, PipelineConfig};
use crate::retrieval::{PassthroughReranker, StaticRetriever};
use crate::solver::{SolverConfig, SolverPool};
use crate::transport::ScriptedTransport;

fn build_state(reply: String, chunks: Vec<ContextChunk>) -> (AppState, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::always(reply));
    let orchestrator = Orchestrator::new(
        Arc::new(FactStore::in_memory()),
        Arc::new(StaticRetriever::new(chunks)),
        Arc::new(PassthroughReranker),
        SolverPool::new(transport.clone(), SolverConfig::default()),
        PipelineConfig::default().with_verification(true),
    );
    (AppState::new(Arc::new(orchestrator)), transport)
}

fn default_chunks() -> Vec<ContextChunk> {
    vec![
        ContextChunk::new("doc1", "X is Y.", 0.9),
        ContextChunk::new("doc2", "Y was confirmed.", 0.8),
    ]
}

fn confident_router() -> (Router, Arc<ScriptedTransport>) {
    let (state, transport) = build_state(
        ScriptedTransport::json_reply("X is Y.", &["doc1", "doc2"], 0.9),
        default_chunks(),
    );
    (create_router_with_state(state), transport)
}

fn answer_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/answer")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn status_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(ARBITER_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_healthz() {
    let (router, _) = confident_router();
    let response = router.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "healthy");
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_ready_in_memory() {
    let (router, _) = confident_router();
    let response = router.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["components"]["fact_backend"], "memory");
    assert_eq!(body["components"]["llm_mode"], "stub");
    assert_eq!(body["components"]["retrieval"], "none");
}

#[tokio::test]
async fn test_ready_reports_missing_storage_dir() {
    let temp = TempDir::new().unwrap();
    let (state, _) = build_state("unused".to_string(), default_chunks());
    let state = state.with_storage_path(temp.path().join("missing"));

    let response = create_router_with_state(state)
        .oneshot(get("/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_header(&response), "not_ready");
}

#[tokio::test]
async fn test_answer_then_cache_hit() {
    let (router, transport) = confident_router();

    let first = router
        .clone()
        .oneshot(answer_request(serde_json::json!({"query": "What is X?"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(status_header(&first), "ANSWERED");

    let body = body_json(first).await;
    assert_eq!(body["answer"], "X is Y.");
    assert_eq!(body["citations"], serde_json::json!(["doc1", "doc2"]));
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["from_cache"], false);
    assert_eq!(body["verification"]["verified"], true);
    assert!(body["id"].as_str().unwrap().starts_with("ans-"));
    assert!(body["latency_ms"].is_u64());

    let second = router
        .oneshot(answer_request(serde_json::json!({"query": "what is x?"})))
        .await
        .unwrap();
    assert_eq!(status_header(&second), "CACHE_HIT");
    let body = body_json(second).await;
    assert_eq!(body["from_cache"], true);
    assert!(body.get("verification").is_none());
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_answer_no_context() {
    let (state, transport) = build_state("unused".to_string(), Vec::new());
    let response = create_router_with_state(state)
        .oneshot(answer_request(serde_json::json!({"query": "anything"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "NO_CONTEXT");
    let body = body_json(response).await;
    assert_eq!(body["answer"], "No relevant context found.");
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_answer_refusal_is_still_200() {
    let (state, _) = build_state(
        ScriptedTransport::json_reply("Maybe.", &["doc1"], 0.3),
        default_chunks(),
    );
    let response = create_router_with_state(state)
        .oneshot(answer_request(serde_json::json!({"query": "What is X?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "REFUSED");
    let body = body_json(response).await;
    assert_eq!(body["answer"], "Insufficient evidence.");
    assert_eq!(body["confidence"], 0.3);
}

#[tokio::test]
async fn test_answer_rejects_empty_query() {
    let (router, transport) = confident_router();
    let response = router
        .oneshot(answer_request(serde_json::json!({"query": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "INVALID_REQUEST");
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("empty"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_answer_rejects_unknown_fields() {
    let (router, _) = confident_router();
    let response = router
        .oneshot(answer_request(
            serde_json::json!({"query": "What is X?", "stream": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_answer_rejects_out_of_range_top_k() {
    let (router, _) = confident_router();
    let response = router
        .oneshot(answer_request(
            serde_json::json!({"query": "What is X?", "top_k": 21}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_answer_rejects_long_query() {
    let (state, _) = build_state("unused".to_string(), default_chunks());
    let router = create_router_with_state(state.with_max_query_tokens(3));
    let response = router
        .oneshot(answer_request(
            serde_json::json!({"query": "one two three four"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top_k_limits_prompt_context() {
    let (state, transport) = build_state(
        ScriptedTransport::json_reply("X is Y.", &["doc1"], 0.8),
        default_chunks(),
    );
    create_router_with_state(state)
        .oneshot(answer_request(
            serde_json::json!({"query": "What is X?", "top_k": 1}),
        ))
        .await
        .unwrap();

    let prompt = transport.requests()[0].user_content().to_string();
    assert!(prompt.contains("[doc1]"));
    assert!(!prompt.contains("[doc2]"));
}

#[tokio::test]
async fn test_facts_listing_and_stats() {
    let (state, _) = build_state("unused".to_string(), default_chunks());
    let facts = state.facts.clone();
    facts.upsert("q1", "A1", &["a".to_string(), "b".to_string()], 0.95);
    facts.upsert("q2", "A2", &["a".to_string(), "b".to_string()], 0.88);
    let router = create_router_with_state(state);

    let response = router
        .clone()
        .oneshot(get("/v1/facts?limit=10&min_confidence=0.9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["facts"][0]["answer"], "A1");
    assert_eq!(body["stats"]["count"], 2);

    let response = router.oneshot(get("/v1/facts/stats")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["total_accesses"], 0);
}

#[tokio::test]
async fn test_facts_rejects_bad_min_confidence() {
    let (router, _) = confident_router();
    let response = router
        .oneshot(get("/v1/facts?min_confidence=2.0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn assert_json_bad_request(response: axum::response::Response) -> serde_json::Value {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "INVALID_REQUEST");
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "got {}", content_type);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    body
}

#[tokio::test]
async fn test_answer_rejects_malformed_json_as_json_error() {
    let (router, transport) = confident_router();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/answer")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let body = assert_json_bad_request(router.oneshot(request).await.unwrap()).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON body"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_answer_rejects_missing_content_type_as_json_error() {
    let (router, transport) = confident_router();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/answer")
        .body(Body::from(r#"{"query": "What is X?"}"#))
        .unwrap();

    assert_json_bad_request(router.oneshot(request).await.unwrap()).await;
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_facts_rejects_unparseable_min_confidence_as_json_error() {
    let (router, _) = confident_router();
    let response = router
        .oneshot(get("/v1/facts?min_confidence=abc"))
        .await
        .unwrap();

    let body = assert_json_bad_request(response).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid query string"));
}

#[test]
fn test_validate_answer_request() {
    let ok = AnswerRequest {
        query: "what is x".to_string(),
        top_k: Some(20),
    };
    assert_eq!(validate_answer_request(&ok, 256).unwrap(), 3);

    let zero_top_k = AnswerRequest {
        query: "x".to_string(),
        top_k: Some(0),
    };
    assert!(validate_answer_request(&zero_top_k, 256).is_err());
}

#[test]
fn test_gateway_error_response_status() {
    let response = GatewayError::InternalError("boom".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status_header(&response), "INTERNAL_ERROR");
}
