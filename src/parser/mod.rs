//! Extraction of `{answer, citations, confidence}` from free-form LLM text.
//!
//! [`parse_response`] never fails: anything it cannot make sense of becomes the canonical
//! refusal. Solvers are asked for strict JSON but routinely wrap it in prose or a fenced
//! block, so extraction searches for an object rather than parsing the whole reply.


use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::answer::ParsedAnswer;

/// Brace-free object mentioning `"answer"` (case-insensitive).
static ANSWER_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\{[^{}]*"answer"[^{}]*\}"#).expect("answer-object pattern is valid")
});

/// First `{...}` span anywhere, shortest match.
static ANY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("object pattern is valid"));

/// Returns the JSON-looking span the parser would decode, if any.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    ANSWER_OBJECT
        .find(raw)
        .or_else(|| ANY_OBJECT.find(raw))
        .map(|m| m.as_str())
}

/// Parses one LLM reply into a [`ParsedAnswer`].
pub fn parse_response(raw: &str) -> ParsedAnswer {
    let Some(span) = extract_json_object(raw) else {
        warn!(response_len = raw.len(), "No JSON object found in LLM response");
        return ParsedAnswer::refusal();
    };

    let value: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to decode JSON object from LLM response");
            return ParsedAnswer::refusal();
        }
    };

    let Some(object) = value.as_object() else {
        warn!("LLM response JSON is not an object");
        return ParsedAnswer::refusal();
    };

    let (Some(answer), Some(citations)) = (object.get("answer"), object.get("citations")) else {
        warn!("LLM response JSON is missing 'answer' or 'citations'");
        return ParsedAnswer::refusal();
    };

    let parsed = ParsedAnswer::new(
        value_to_text(answer),
        coerce_citations(citations),
        coerce_confidence(object.get("confidence")),
    );

    debug!(
        citations = parsed.citations().len(),
        confidence = parsed.confidence(),
        "Parsed LLM response"
    );
    parsed
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_citations(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        _ => Vec::new(),
    }
}

fn coerce_confidence(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    // ParsedAnswer::new clamps; NaN maps to 0.0
    raw.unwrap_or(0.0)
}
