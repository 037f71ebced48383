use crate::answer::ContextChunk;
use crate::transport::ChatMessage;

/// System prompt shared by every solver.
pub const SYSTEM_PROMPT: &str = r#"You are a careful assistant that answers strictly from the provided context.

Rules:
1. Use only information found in the CONTEXT passages. Do not rely on prior knowledge.
2. Cite every passage you rely on by its id, e.g. "doc_17".
3. If the context does not support an answer with confidence at or above the evidence
   threshold TAU, answer exactly "Insufficient evidence." with an empty citation list.
4. Report your confidence as a number between 0.0 and 1.0.

Reply with a single JSON object and nothing else:
{"answer": "<answer text>", "citations": ["<id>", "..."], "confidence": <0.0-1.0>}"#;

pub const NO_CONTEXT_PLACEHOLDER: &str = "No context available.";

const CHUNK_SEPARATOR: &str = "\n---\n";

/// Renders chunks as `[id] score=0.912` headers followed by their text.
pub fn format_context(chunks: &[ContextChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }
    chunks
        .iter()
        .map(|c| format!("[{}] score={:.3}\n{}", c.id, c.score, c.text))
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}

/// Builds the system + user message pair sent to each solver.
pub fn make_messages(query: &str, chunks: &[ContextChunk], tau: f64) -> Vec<ChatMessage> {
    let user = format!(
        "QUERY: {query}\n\nTAU (evidence threshold): {tau}\n\nCONTEXT:\n{}\n\n\
         Provide your answer in strict JSON format as specified.",
        format_context(chunks)
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}
