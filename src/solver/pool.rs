use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, info};

use crate::answer::{Candidate, ContextChunk};
use crate::parser::parse_response;
use crate::transport::{ChatMessage, ChatRequest, ChatTransport, SamplingParams};

use super::config::{SolverConfig, temperature_for};
use super::prompt::make_messages;

/// Generates independent candidates by sampling the LLM at different temperatures.
pub struct SolverPool {
    transport: Arc<dyn ChatTransport>,
    config: SolverConfig,
}

impl std::fmt::Debug for SolverPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverPool")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SolverPool {
    pub fn new(transport: Arc<dyn ChatTransport>, config: SolverConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Generates the configured number of candidates with the configured schedule.
    pub async fn solve_configured(
        &self,
        query: &str,
        chunks: &[ContextChunk],
        tau: f64,
    ) -> Vec<Candidate> {
        self.solve(
            query,
            chunks,
            tau,
            self.config.effective_solvers(),
            &self.config.temperatures,
        )
        .await
    }

    /// Returns exactly `n` candidates, indexed by generation order.
    ///
    /// A failed call yields a zero-confidence refusal carrying the error; it never fails
    /// the batch.
    pub async fn solve(
        &self,
        query: &str,
        chunks: &[ContextChunk],
        tau: f64,
        n: usize,
        schedule: &[f64],
    ) -> Vec<Candidate> {
        let messages = make_messages(query, chunks, tau);

        debug!(
            solvers = n,
            context_chunks = chunks.len(),
            "Dispatching solver calls"
        );

        let attempts = (0..n).map(|solver_id| {
            let temperature = temperature_for(schedule, solver_id);
            self.solve_one(solver_id, temperature, &messages)
        });

        // join_all keeps input order, so index i holds solver i
        join_all(attempts).await
    }

    async fn solve_one(
        &self,
        solver_id: usize,
        temperature: f64,
        messages: &[ChatMessage],
    ) -> Candidate {
        let request = ChatRequest::new(messages.to_vec())
            .with_model(self.config.model.clone())
            .with_sampling(SamplingParams {
                max_tokens: self.config.max_tokens,
                temperature,
                top_p: self.config.top_p,
            })
            .with_timeout(self.config.timeout);

        match self.transport.send(&request).await {
            Ok(raw) => {
                let candidate = Candidate::from_parsed(parse_response(&raw), solver_id, temperature);
                info!(
                    solver_id,
                    temperature,
                    confidence = candidate.confidence(),
                    citations = candidate.citations().len(),
                    "Solver produced candidate"
                );
                candidate
            }
            Err(e) => {
                error!(solver_id, temperature, error = %e, "Solver failed");
                Candidate::failed(solver_id, temperature, e.to_string())
            }
        }
    }
}
