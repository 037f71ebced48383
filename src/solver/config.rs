use std::time::Duration;

use crate::constants::{
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_MAX_TOKENS, DEFAULT_SOLVER_MODEL, DEFAULT_SOLVERS,
    DEFAULT_TEMPERATURE_SCHEDULE, DEFAULT_TOP_P,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Candidates per query when multi-agent mode is on.
    pub solvers: usize,
    /// Candidate `i` samples at `temperatures[i % len]`. Empty means the default schedule.
    pub temperatures: Vec<f64>,
    /// When `false`, exactly one candidate is generated.
    pub multi_agent: bool,
    pub model: String,
    pub max_tokens: u32,
    pub top_p: f64,
    /// Per-attempt LLM timeout.
    pub timeout: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solvers: DEFAULT_SOLVERS,
            temperatures: DEFAULT_TEMPERATURE_SCHEDULE.to_vec(),
            multi_agent: true,
            model: DEFAULT_SOLVER_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

impl SolverConfig {
    pub fn with_solvers(mut self, solvers: usize) -> Self {
        self.solvers = solvers;
        self
    }

    pub fn with_multi_agent(mut self, multi_agent: bool) -> Self {
        self.multi_agent = multi_agent;
        self
    }

    pub fn with_temperatures(mut self, temperatures: Vec<f64>) -> Self {
        self.temperatures = temperatures;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of candidates actually generated.
    pub fn effective_solvers(&self) -> usize {
        if self.multi_agent { self.solvers } else { 1 }
    }
}

/// Temperature for candidate `index`, falling back to the default schedule when empty.
pub fn temperature_for(schedule: &[f64], index: usize) -> f64 {
    let schedule = if schedule.is_empty() {
        &DEFAULT_TEMPERATURE_SCHEDULE[..]
    } else {
        schedule
    };
    schedule[index % schedule.len()]
}
