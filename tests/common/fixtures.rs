//! Test data builders.

use arbiter::ContextChunk;
use arbiter::transport::ScriptedTransport;

pub const QUESTION: &str = "What is the boiling point of water at sea level?";
pub const ANSWER: &str = "100 degrees Celsius.";

pub fn chunks() -> Vec<ContextChunk> {
    vec![
        ContextChunk::new("phys-12", "Water boils at 100 °C at one atmosphere.", 0.93),
        ContextChunk::new("phys-40", "Sea-level pressure is one atmosphere.", 0.87),
        ContextChunk::new("chem-03", "Boiling point depends on pressure.", 0.61),
    ]
}

pub fn citations(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// A reply that clears both the evidence gate and the promotion policy.
pub fn confident_reply() -> String {
    ScriptedTransport::json_reply(ANSWER, &["phys-12", "phys-40"], 0.92)
}

/// A reply below the default evidence threshold.
pub fn weak_reply() -> String {
    ScriptedTransport::json_reply("Probably around 100.", &["phys-12"], 0.4)
}

/// Search service body in the `{"hits": [...]}` shape with mixed key names.
pub fn search_body() -> serde_json::Value {
    serde_json::json!({
        "hits": [
            {"id": "phys-12", "text": "Water boils at 100 °C at one atmosphere.", "score": 0.93},
            {"doc_id": "phys-40", "content": "Sea-level pressure is one atmosphere.", "score": 0.87},
            {"doc_id": 7, "content": "Boiling point depends on pressure."}
        ]
    })
}
