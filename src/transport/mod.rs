//! LLM chat transport.
//!
//! Two layers:
//! - [`ChatExchange`]: exactly one attempt, returning text or a classified
//!   [`AttemptFailure`] (`Retryable`, `Fatal`, `RateLimited`).
//! - [`ChatTransport`]: what the solvers call. [`RetryingTransport`] adds bounded retries with
//!   exponential backoff around any exchange; [`StubTransport`] answers offline.
//!
//! Retry decisions are made by [`RetryPolicy::decide`] over the classification alone, so the
//! policy is testable without a network or a clock.

pub mod error;
pub mod http;
pub mod retry;
pub mod stub;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


use async_trait::async_trait;

pub use error::{TransportError, TransportResult};
pub use http::{DEFAULT_LLM_ENDPOINT, HttpExchange};
#[cfg(any(test, feature = "mock"))]
pub use mock::{ScriptedExchange, ScriptedTransport};
pub use retry::{RetryDecision, RetryPolicy, RetryingTransport};
pub use stub::{StubTransport, stub_reply};
pub use types::{AttemptFailure, ChatMessage, ChatRequest, FailureClass, Role, SamplingParams};

#[async_trait]
/// One attempt against an LLM provider.
pub trait ChatExchange: Send + Sync {
    async fn exchange(&self, request: &ChatRequest) -> Result<String, AttemptFailure>;
}

#[async_trait]
/// Sends a chat request and returns the raw completion text.
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> TransportResult<String>;
}
