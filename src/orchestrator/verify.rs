use tracing::debug;

use crate::answer::{TaskType, Verification};

const MATH_MARKERS: [&str; 5] = ["calculate", "compute", "what is", "sum", "multiply"];
const CODE_MARKERS: [&str; 4] = ["code", "function", "implement", "program"];

/// Keyword heuristic over the lower-cased query. Math markers win over code markers.
pub fn detect_task_type(query: &str) -> TaskType {
    let query = query.to_lowercase();
    if MATH_MARKERS.iter().any(|m| query.contains(m)) {
        TaskType::Math
    } else if CODE_MARKERS.iter().any(|m| query.contains(m)) {
        TaskType::Code
    } else {
        TaskType::Factual
    }
}

/// Annotates an answer with its task type. Never inspects or alters the answer itself.
pub fn verify_answer(answer: &str, query: &str, task_type: Option<TaskType>) -> Verification {
    let task_type = task_type.unwrap_or_else(|| detect_task_type(query));
    let note = match task_type {
        TaskType::Math => "Math answer accepted without arithmetic check",
        TaskType::Code => "Code answer accepted without execution",
        TaskType::Factual => "Evidence-based verification",
    };

    debug!(%task_type, answer_len = answer.len(), "Verified answer");

    Verification {
        verified: true,
        task_type,
        note: note.to_string(),
    }
}
