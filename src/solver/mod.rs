//! Candidate generation.
//!
//! Each query is sent to `n` solver calls that differ only in sampling temperature. Calls
//! run concurrently; a failing call becomes an error candidate instead of failing the batch.

pub mod config;
pub mod pool;
pub mod prompt;


pub use config::{SolverConfig, temperature_for};
pub use pool::SolverPool;
pub use prompt::{NO_CONTEXT_PLACEHOLDER, SYSTEM_PROMPT, format_context, make_messages};
