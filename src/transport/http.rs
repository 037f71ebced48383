//! OpenAI-compatible chat-completion exchange over HTTP.

use std::time::{Duration, Instant};

use async_openai::types::chat::CreateChatCompletionResponse;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::ChatExchange;
use super::types::{AttemptFailure, ChatRequest};

/// Default DeepSeek chat endpoint.
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";

const ERROR_BODY_PREVIEW: usize = 200;

/// Single-attempt HTTP exchange. Wrap in a `RetryingTransport` for retries.
#[derive(Clone)]
pub struct HttpExchange {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExchange")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpExchange {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: HttpClient::builder()
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatExchange for HttpExchange {
    async fn exchange(&self, request: &ChatRequest) -> Result<String, AttemptFailure> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AttemptFailure::fatal(None, "LLM API key is not configured"));
        };

        let body = json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.sampling.max_tokens,
            "temperature": request.sampling.temperature,
            "top_p": request.sampling.top_p,
        });

        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(e, request.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                parse_retry_after(response.headers())
            } else {
                None
            };
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            debug!(status = status.as_u16(), "LLM endpoint returned error status");
            return Err(AttemptFailure::from_status(
                status.as_u16(),
                retry_after,
                &preview,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttemptFailure::retryable(format!("failed to read LLM response: {e}")))?;
        let content = extract_content(&bytes)?;

        info!(
            model = %request.model,
            temperature = request.sampling.temperature,
            duration_ms = started.elapsed().as_millis() as u64,
            response_len = content.len(),
            "LLM call completed"
        );
        Ok(content)
    }
}

fn classify_send_error(error: reqwest::Error, timeout: Duration) -> AttemptFailure {
    if error.is_timeout() {
        AttemptFailure::timeout(timeout)
    } else {
        AttemptFailure::retryable(format!("LLM request failed: {error}"))
    }
}

/// Parses `Retry-After` as (possibly fractional) seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion body.
pub fn extract_content(body: &[u8]) -> Result<String, AttemptFailure> {
    if let Ok(response) = serde_json::from_slice::<CreateChatCompletionResponse>(body)
        && let Some(content) = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    {
        return Ok(content);
    }

    // Some compatible providers omit fields the typed response requires.
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AttemptFailure::retryable(format!("LLM response is not JSON: {e}")))?;

    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AttemptFailure::retryable("LLM response has no choices[0].message.content"))
}
