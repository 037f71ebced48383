//! Arbiter library crate (used by the server and integration tests).
//!
//! Answers a question by sampling several LLM solvers over retrieved context, judging the
//! candidates, refusing when the evidence is too weak, and caching confident answers in a
//! monotonic fact store.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`Orchestrator`], [`PipelineConfig`] - Cache check through promotion
//! - [`SolverPool`], [`SolverConfig`] - Candidate generation
//! - [`Judge`], [`gate`] - Selection and the evidence threshold
//! - [`parse_response`] - Tolerant JSON extraction from model output
//!
//! ## Collaborators
//! - [`ChatTransport`], [`RetryingTransport`], [`HttpExchange`], [`StubTransport`] - LLM access
//! - [`Retriever`], [`Reranker`], [`HttpRetriever`] - Context retrieval
//!
//! ## Storage
//! - [`FactStore`], [`FactRecord`], [`PromotionPolicy`] - The answer cache
//!
//! ## Test/Mock Support
//! Scripted transports are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod cache;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod orchestrator;
pub mod parser;
pub mod retrieval;
pub mod scoring;
pub mod solver;
pub mod transport;

pub use answer::{
    ARBITER_STATUS_HEADER, AnswerStatus, Candidate, ContextChunk, JudgedResult, ParsedAnswer,
    TaskType, Verification,
};
pub use cache::{
    DiskFactBackend, FactBackend, FactRecord, FactStats, FactStore, FactStoreError,
    FactStoreResult, MemoryFactBackend, PromotionPolicy, UpsertOutcome,
};
pub use config::{Config, ConfigError};
pub use constants::{NO_CONTEXT_ANSWER, REFUSAL_ANSWER, ThresholdValidationError};
pub use hashing::{hash_question, normalize_question, question_key};
pub use orchestrator::{Answer, AnswerOptions, Orchestrator, PipelineConfig};
pub use parser::parse_response;
pub use retrieval::{
    HttpRetriever, PassthroughReranker, Reranker, RetrievalError, Retriever, ScoreReranker,
    StaticRetriever,
};
pub use scoring::{CandidateScorer, Judge, Verdict, gate, judge, score};
pub use solver::{SolverConfig, SolverPool};
pub use transport::{
    AttemptFailure, ChatMessage, ChatRequest, ChatTransport, FailureClass, HttpExchange,
    RetryPolicy, RetryingTransport, StubTransport, TransportError,
};
#[cfg(any(test, feature = "mock"))]
pub use transport::{ScriptedExchange, ScriptedTransport};
