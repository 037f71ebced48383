//! End-to-end HTTP tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use arbiter::orchestrator::PipelineConfig;
use arbiter::retrieval::{HttpRetriever, StaticRetriever};
use arbiter::transport::ScriptedTransport;

use common::fixtures::{self, ANSWER, QUESTION};
use common::harness::{TestServerConfig, spawn_search_service, spawn_test_server};
use common::http_client::TestClient;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let health = TestClient::new(server.url())
        .health()
        .await
        .expect("Health check should succeed");
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_ready_reports_disk_backend() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .expect("Server should start");

    let ready = TestClient::new(server.url())
        .get_json("/ready")
        .await
        .expect("Ready check should succeed");
    assert_eq!(ready["status"], "ready");
    assert_eq!(ready["components"]["fact_backend"], "disk");
}

#[tokio::test]
async fn test_answer_is_promoted_and_served_from_cache() {
    let transport = Arc::new(ScriptedTransport::always(fixtures::confident_reply()));
    let server = spawn_test_server(TestServerConfig {
        transport: transport.clone(),
        ..Default::default()
    })
    .await
    .expect("Server should start");
    let client = TestClient::new(server.url());

    let (first, status) = client.answer(QUESTION).await.unwrap();
    assert_eq!(status, "ANSWERED");
    assert_eq!(first.answer, ANSWER);
    assert_eq!(first.citations, fixtures::citations(&["phys-12", "phys-40"]));
    assert!(!first.from_cache);

    let (second, status) = client
        .answer("what is the BOILING point of water at sea level?")
        .await
        .unwrap();
    assert_eq!(status, "CACHE_HIT");
    assert!(second.from_cache);
    assert_eq!(second.answer, ANSWER);
    assert_eq!(second.confidence, first.confidence);
    assert_eq!(transport.calls(), 3);

    let stats = client.get_json("/v1/facts/stats").await.unwrap();
    assert_eq!(stats["count"], 1);
    assert_eq!(stats["total_accesses"], 1);
}

#[tokio::test]
async fn test_facts_survive_restart() {
    let temp = tempfile::TempDir::new().unwrap();
    let storage_path = temp.path().join("facts");

    {
        let server = spawn_test_server(TestServerConfig {
            storage_path: Some(storage_path.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
        let (_, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
        assert_eq!(status, "ANSWERED");
    }

    let transport = Arc::new(ScriptedTransport::always("unused"));
    let server = spawn_test_server(TestServerConfig {
        storage_path: Some(storage_path),
        transport: transport.clone(),
        ..Default::default()
    })
    .await
    .unwrap();

    let (body, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
    assert_eq!(status, "CACHE_HIT");
    assert_eq!(body.answer, ANSWER);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_weak_evidence_is_refused_and_not_cached() {
    let server = spawn_test_server(TestServerConfig {
        transport: Arc::new(ScriptedTransport::always(fixtures::weak_reply())),
        ..Default::default()
    })
    .await
    .unwrap();
    let client = TestClient::new(server.url());

    let (body, status) = client.answer(QUESTION).await.unwrap();
    assert_eq!(status, "REFUSED");
    assert_eq!(body.answer, "Insufficient evidence.");
    assert_eq!(body.confidence, 0.4);
    assert!(body.citations.is_empty());

    let facts = client.get_json("/v1/facts").await.unwrap();
    assert_eq!(facts["count"], 0);
}

#[tokio::test]
async fn test_no_context_answer() {
    let server = spawn_test_server(TestServerConfig {
        retriever: Arc::new(StaticRetriever::empty()),
        ..Default::default()
    })
    .await
    .unwrap();

    let (body, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
    assert_eq!(status, "NO_CONTEXT");
    assert_eq!(body.answer, "No relevant context found.");
    assert_eq!(body.confidence, 0.0);
}

#[tokio::test]
async fn test_http_retriever_feeds_prompt() {
    let search_url = spawn_search_service(fixtures::search_body()).await;
    let transport = Arc::new(ScriptedTransport::always(fixtures::confident_reply()));
    let server = spawn_test_server(TestServerConfig {
        transport: transport.clone(),
        retriever: Arc::new(HttpRetriever::new(search_url)),
        ..Default::default()
    })
    .await
    .unwrap();

    let (_, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
    assert_eq!(status, "ANSWERED");

    let prompt = transport.requests()[0].user_content().to_string();
    assert!(prompt.contains("[phys-12] score=0.930"));
    assert!(prompt.contains("[phys-40] score=0.870"));
    assert!(prompt.contains("[7] score=0.000"));
}

#[tokio::test]
async fn test_unreachable_search_service_means_no_context() {
    let server = spawn_test_server(TestServerConfig {
        retriever: Arc::new(HttpRetriever::new("http://127.0.0.1:9")),
        ..Default::default()
    })
    .await
    .unwrap();

    let (_, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
    assert_eq!(status, "NO_CONTEXT");
}

#[tokio::test]
async fn test_verification_note_in_response() {
    let server = spawn_test_server(TestServerConfig {
        pipeline: PipelineConfig::default().with_verification(true),
        ..Default::default()
    })
    .await
    .unwrap();

    let (body, _) = TestClient::new(server.url())
        .answer("Calculate the boiling point of water")
        .await
        .unwrap();
    let verification = body.verification.expect("verification present");
    assert_eq!(verification["task_type"], "math");
    assert_eq!(verification["verified"], true);
}

#[tokio::test]
async fn test_request_timeout_refuses() {
    struct Stalled;

    #[async_trait::async_trait]
    impl arbiter::transport::ChatTransport for Stalled {
        async fn send(
            &self,
            _request: &arbiter::transport::ChatRequest,
        ) -> arbiter::transport::TransportResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }
    }

    let server = spawn_test_server(TestServerConfig {
        transport: Arc::new(Stalled),
        pipeline: PipelineConfig::default().with_request_timeout(Duration::from_millis(100)),
        ..Default::default()
    })
    .await
    .unwrap();

    let (body, status) = TestClient::new(server.url()).answer(QUESTION).await.unwrap();
    assert_eq!(status, "TIMED_OUT");
    assert_eq!(body.confidence, 0.0);
    assert!(body.latency_ms < 5_000);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = spawn_test_server(TestServerConfig::default()).await.unwrap();
    let client = TestClient::new(server.url());

    let resp = client
        .post_raw("/v1/answer", r#"{"question": "wrong field"}"#)
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 400);
}
