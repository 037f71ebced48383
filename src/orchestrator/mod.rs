//! Query orchestration.
//!
//! ```text
//! CACHE_CHECK ─hit─▶ respond (from_cache)
//!      │miss
//!      ▼
//! RETRIEVE ─empty─▶ respond ("No relevant context found.")
//!      ▼
//! RERANK ▶ GENERATE ▶ JUDGE ▶ GATE ▶ VERIFY? ▶ PROMOTE? ▶ respond
//! ```
//!
//! The miss path runs under the request timeout; on expiry in-flight solver calls are
//! dropped and a zero-confidence refusal is returned. Fact store I/O runs on the blocking
//! pool.

pub mod config;
pub mod pipeline;
pub mod verify;


pub use config::PipelineConfig;
pub use pipeline::{Answer, AnswerOptions, Orchestrator};
pub use verify::{detect_task_type, verify_answer};
