use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cache::FactRecord;
use crate::constants::{NO_CONTEXT_ANSWER, REFUSAL_ANSWER, REFUSAL_PREFIX, clamp_confidence};

/// Deduplicates citations, keeping the first occurrence of each.
pub fn dedup_citations<I, S>(citations: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .map(Into::into)
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Returns `true` if `answer` is a refusal.
#[inline]
pub fn is_refusal_text(answer: &str) -> bool {
    answer.trim_start().starts_with(REFUSAL_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A scored passage handed to the solvers as evidence.
pub struct ContextChunk {
    /// Source identifier the solvers cite.
    pub id: String,
    /// Passage text.
    pub text: String,
    /// Retrieval or rerank score.
    pub score: f64,
}

impl ContextChunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// `{answer, citations, confidence}` extracted from one LLM reply.
///
/// Construction clamps the confidence and deduplicates citations.
pub struct ParsedAnswer {
    answer: String,
    citations: Vec<String>,
    confidence: f64,
}

impl ParsedAnswer {
    pub fn new<I, S>(answer: impl Into<String>, citations: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answer: answer.into(),
            citations: dedup_citations(citations),
            confidence: clamp_confidence(confidence),
        }
    }

    /// The canonical refusal: no citations, zero confidence.
    pub fn refusal() -> Self {
        Self {
            answer: REFUSAL_ANSWER.to_string(),
            citations: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn citations(&self) -> &[String] {
        &self.citations
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_refusal(&self) -> bool {
        is_refusal_text(&self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One solver attempt. Immutable once built.
pub struct Candidate {
    answer: String,
    citations: Vec<String>,
    confidence: f64,
    solver_id: usize,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Candidate {
    /// Builds a candidate with `solver_id = 0` and `temperature = 0.0`.
    ///
    /// Use [`with_solver`](Self::with_solver) to attach generation metadata.
    pub fn new<I, S>(answer: impl Into<String>, citations: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_parsed(ParsedAnswer::new(answer, citations, confidence), 0, 0.0)
    }

    pub fn from_parsed(parsed: ParsedAnswer, solver_id: usize, temperature: f64) -> Self {
        Self {
            answer: parsed.answer,
            citations: parsed.citations,
            confidence: parsed.confidence,
            solver_id,
            temperature,
            error: None,
        }
    }

    /// Zero-confidence refusal standing in for a solver whose transport failed.
    pub fn failed(solver_id: usize, temperature: f64, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_parsed(ParsedAnswer::refusal(), solver_id, temperature)
        }
    }

    pub fn with_solver(self, solver_id: usize, temperature: f64) -> Self {
        Self {
            solver_id,
            temperature,
            ..self
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn citations(&self) -> &[String] {
        &self.citations
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn solver_id(&self) -> usize {
        self.solver_id
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_refusal(&self) -> bool {
        is_refusal_text(&self.answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Coarse task classification used by the verifier.
pub enum TaskType {
    Math,
    Code,
    Factual,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Math => "math",
            TaskType::Code => "code",
            TaskType::Factual => "factual",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Annotation attached by the verify step. Never changes the answer.
pub struct Verification {
    pub verified: bool,
    pub task_type: TaskType,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// The unit returned for every query.
pub struct JudgedResult {
    answer: String,
    citations: Vec<String>,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    solver_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification: Option<Verification>,
    from_cache: bool,
}

impl JudgedResult {
    /// Canonical refusal carrying `confidence` (clamped).
    pub fn refusal(confidence: f64) -> Self {
        Self {
            answer: REFUSAL_ANSWER.to_string(),
            citations: Vec::new(),
            confidence: clamp_confidence(confidence),
            solver_id: None,
            temperature: None,
            error: None,
            verification: None,
            from_cache: false,
        }
    }

    /// Zero-confidence answer for a query with no retrievable context.
    pub fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_ANSWER.to_string(),
            ..Self::refusal(0.0)
        }
    }

    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            answer: candidate.answer.clone(),
            citations: candidate.citations.clone(),
            confidence: candidate.confidence,
            solver_id: Some(candidate.solver_id),
            temperature: Some(candidate.temperature),
            error: candidate.error.clone(),
            verification: None,
            from_cache: false,
        }
    }

    pub fn from_fact(record: &FactRecord) -> Self {
        Self {
            answer: record.answer.clone(),
            citations: record.citations.clone(),
            confidence: clamp_confidence(record.confidence),
            from_cache: true,
            ..Self::refusal(0.0)
        }
    }

    pub fn with_verification(self, verification: Verification) -> Self {
        Self {
            verification: Some(verification),
            ..self
        }
    }

    /// Replaces the answer with the canonical refusal, keeping the confidence.
    pub(crate) fn into_refusal(self) -> Self {
        Self {
            from_cache: self.from_cache,
            ..Self::refusal(self.confidence)
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn citations(&self) -> &[String] {
        &self.citations
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn solver_id(&self) -> Option<usize> {
        self.solver_id
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn is_refusal(&self) -> bool {
        is_refusal_text(&self.answer)
    }
}
