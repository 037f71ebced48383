//! Scripted transports for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{TransportError, TransportResult};
use super::types::{AttemptFailure, ChatRequest};
use super::{ChatExchange, ChatTransport};

type Responder = dyn Fn(usize, &ChatRequest) -> TransportResult<String> + Send + Sync;

/// [`ChatTransport`] whose replies come from a closure of `(call_index, request)`.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &ChatRequest) -> TransportResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `text` to every call.
    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Replies by temperature; unknown temperatures get `fallback`.
    pub fn by_temperature(replies: Vec<(f64, String)>, fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        Self::new(move |_, request| {
            let reply = replies
                .iter()
                .find(|(t, _)| (*t - request.sampling.temperature).abs() < 1e-9)
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| fallback.clone());
            Ok(reply)
        })
    }

    /// Fails every call with an exhausted-retries error.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_, _| {
            Err(TransportError::Exhausted {
                attempts: 1,
                last: AttemptFailure::retryable(message.clone()),
            })
        })
    }

    /// Builds the JSON reply a well-behaved solver would produce.
    pub fn json_reply(answer: &str, citations: &[&str], confidence: f64) -> String {
        serde_json::json!({
            "answer": answer,
            "citations": citations,
            "confidence": confidence,
        })
        .to_string()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> TransportResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        (self.responder)(call, request)
    }
}

/// [`ChatExchange`] that plays back a fixed sequence of attempt outcomes.
///
/// Once the script runs out every further attempt is a retryable failure.
pub struct ScriptedExchange {
    script: Mutex<VecDeque<Result<String, AttemptFailure>>>,
    calls: AtomicUsize,
}

impl ScriptedExchange {
    pub fn new(script: Vec<Result<String, AttemptFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatExchange for ScriptedExchange {
    async fn exchange(&self, _request: &ChatRequest) -> Result<String, AttemptFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AttemptFailure::retryable("script exhausted")))
    }
}
