use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_MAX_TOKENS, DEFAULT_SOLVER_MODEL, DEFAULT_TOP_P,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One chat-completion request. `timeout` bounds each attempt, not the retry loop.
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub sampling: SamplingParams,
    pub timeout: Duration,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: DEFAULT_SOLVER_MODEL.to_string(),
            sampling: SamplingParams::default(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Content of the first user message, or `""`.
    pub fn user_content(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
/// How a single failed attempt should be treated.
pub enum FailureClass {
    /// Timeout, connection error, 5xx or undecodable body.
    Retryable,
    /// Client error other than 429, or a local precondition failure.
    Fatal { status: Option<u16> },
    /// HTTP 429, optionally with the provider's `Retry-After`.
    RateLimited { retry_after: Option<Duration> },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
/// A classified failure of one exchange attempt.
pub struct AttemptFailure {
    pub class: FailureClass,
    pub message: String,
}

impl AttemptFailure {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Retryable,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::retryable(format!("request timed out after {:?}", after))
    }

    pub fn fatal(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Fatal { status },
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self {
            class: FailureClass::RateLimited { retry_after },
            message: "rate limited (HTTP 429)".to_string(),
        }
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        match status {
            429 => Self::rate_limited(retry_after),
            400..=499 => Self::fatal(Some(status), format!("HTTP {status}: {body}")),
            _ => Self::retryable(format!("HTTP {status}: {body}")),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.class, FailureClass::Fatal { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self.class {
            FailureClass::Fatal { status } => status,
            FailureClass::RateLimited { .. } => Some(429),
            FailureClass::Retryable => None,
        }
    }
}
