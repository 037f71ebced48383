use async_trait::async_trait;
use tracing::debug;

use super::ChatTransport;
use super::error::TransportResult;
use super::types::ChatRequest;

/// Characters of the user message echoed back by [`stub_reply`].
pub const STUB_PREVIEW_CHARS: usize = 120;

/// Deterministic reply derived from the request's user message.
pub fn stub_reply(request: &ChatRequest) -> String {
    let collapsed = request
        .user_content()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = collapsed.chars().take(STUB_PREVIEW_CHARS).collect();

    if preview.is_empty() {
        "Answer: No context (stubbed)".to_string()
    } else {
        format!("Answer: {preview} (stubbed)")
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Offline transport that never touches the network.
pub struct StubTransport;

impl StubTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send(&self, request: &ChatRequest) -> TransportResult<String> {
        debug!(model = %request.model, "Returning stubbed LLM reply");
        Ok(stub_reply(request))
    }
}
