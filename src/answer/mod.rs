//! Value types that flow through the pipeline: context chunks, candidates and the
//! judged result returned to callers.
//!
//! Confidence is clamped to `[0.0, 1.0]` at construction and citations are an ordered set.
//! None of these types expose mutable access after construction.

pub mod status;
pub mod types;


pub use status::{
    ARBITER_STATUS_ERROR, ARBITER_STATUS_HEADER, ARBITER_STATUS_HEALTHY, ARBITER_STATUS_NOT_READY,
    ARBITER_STATUS_READY, AnswerStatus,
};
pub use types::{
    Candidate, ContextChunk, JudgedResult, ParsedAnswer, TaskType, Verification,
    dedup_citations, is_refusal_text,
};
