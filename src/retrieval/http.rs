use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::answer::ContextChunk;

use super::Retriever;
use super::error::{RetrievalError, RetrievalResult};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const MISSING_ID: &str = "???";

/// One search hit as the service returns it. Key names vary between deployments.
#[derive(Debug, Deserialize)]
pub struct RawHit {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    doc_id: Option<Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<RawHit> for ContextChunk {
    fn from(hit: RawHit) -> Self {
        let id = hit
            .id
            .filter(|v| !v.is_null())
            .or(hit.doc_id.filter(|v| !v.is_null()))
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| MISSING_ID.to_string());

        ContextChunk {
            id,
            text: hit.text.or(hit.content).unwrap_or_default(),
            score: hit.score.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { hits: Vec<RawHit> },
    Bare(Vec<RawHit>),
}

/// Normalizes a search response body (`{"hits": [...]}` or a bare array) into chunks.
pub fn parse_search_response(body: &[u8]) -> RetrievalResult<Vec<ContextChunk>> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| RetrievalError::InvalidResponse {
            reason: e.to_string(),
        })?;

    let hits = match response {
        SearchResponse::Wrapped { hits } | SearchResponse::Bare(hits) => hits,
    };
    Ok(hits.into_iter().map(ContextChunk::from).collect())
}

/// Client for an external `POST {base}/search` service.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    http: HttpClient,
    base_url: String,
}

impl HttpRetriever {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn search(&self, query: &str, top_k: usize) -> RetrievalResult<Vec<ContextChunk>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "query": query, "top_k": top_k }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let mut chunks = parse_search_response(&body)?;
        chunks.truncate(top_k);

        debug!(hits = chunks.len(), top_k, "Search completed");
        Ok(chunks)
    }
}
