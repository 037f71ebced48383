//! HTTP client helpers for tests.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    pub answer: String,
    pub citations: Vec<String>,
    pub confidence: f64,
    pub latency_ms: u64,
    pub from_cache: bool,
    #[serde(default)]
    pub verification: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct HealthBody {
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns the parsed body and the `X-Arbiter-Status` header.
    pub async fn answer(&self, query: &str) -> Result<(AnswerBody, String), TestClientError> {
        let resp = self
            .client
            .post(self.url("/v1/answer"))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status_header = resp
            .headers()
            .get("x-arbiter-status")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        if !resp.status().is_success() {
            return Err(TestClientError::Status {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        Ok((resp.json().await?, status_header))
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> Result<reqwest::Response, TestClientError> {
        Ok(self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?)
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, TestClientError> {
        let resp = self.client.get(self.url(path)).send().await?;
        Ok(resp.json().await?)
    }

    pub async fn health(&self) -> Result<HealthBody, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;
        Ok(resp.json().await?)
    }
}
