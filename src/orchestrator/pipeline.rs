use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use crate::answer::{AnswerStatus, ContextChunk, JudgedResult};
use crate::cache::{FactRecord, FactStore};
use crate::retrieval::{Reranker, Retriever};
use crate::scoring::{Judge, gate};
use crate::solver::SolverPool;

use super::config::PipelineConfig;
use super::verify::verify_answer;

#[derive(Debug, Clone, PartialEq)]
/// What the orchestrator hands back for one query.
pub struct Answer {
    pub result: JudgedResult,
    pub status: AnswerStatus,
    pub latency_ms: u64,
}

impl Answer {
    fn new(result: JudgedResult, status: AnswerStatus, started: Instant) -> Self {
        Self {
            result,
            status,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Per-query overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerOptions {
    /// Rerank depth; falls back to [`PipelineConfig::top_k_final`].
    pub top_k_final: Option<usize>,
}

/// Runs cache lookup, retrieval, generation, judging, gating, verification and promotion.
pub struct Orchestrator {
    facts: Arc<FactStore>,
    retriever: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    solvers: SolverPool,
    judge: Judge,
    config: PipelineConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("facts", &self.facts)
            .field("solvers", &self.solvers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        facts: Arc<FactStore>,
        retriever: Arc<dyn Retriever>,
        reranker: Arc<dyn Reranker>,
        solvers: SolverPool,
        config: PipelineConfig,
    ) -> Self {
        Self {
            facts,
            retriever,
            reranker,
            solvers,
            judge: Judge::default(),
            config,
        }
    }

    pub fn with_judge(mut self, judge: Judge) -> Self {
        self.judge = judge;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn facts(&self) -> &Arc<FactStore> {
        &self.facts
    }

    pub async fn answer(&self, query: &str) -> Answer {
        self.answer_with(query, AnswerOptions::default()).await
    }

    /// Answers `query`. Always returns a result; failures degrade to refusals.
    #[instrument(skip(self, query, options), fields(query_len = query.len()))]
    pub async fn answer_with(&self, query: &str, options: AnswerOptions) -> Answer {
        let started = Instant::now();

        if let Some(record) = self.cache_lookup(query).await {
            return Answer::new(
                JudgedResult::from_fact(&record),
                AnswerStatus::CacheHit,
                started,
            );
        }

        let top_k_final = options.top_k_final.unwrap_or(self.config.top_k_final);
        let outcome = tokio::time::timeout(
            self.config.request_timeout,
            self.answer_uncached(query, top_k_final),
        )
        .await;

        let (result, status) = match outcome {
            Ok(answered) => answered,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.request_timeout.as_millis() as u64,
                    "Request timed out, refusing"
                );
                (JudgedResult::refusal(0.0), AnswerStatus::TimedOut)
            }
        };

        // outside the budget so a stored fact is never reported as a timeout
        if status != AnswerStatus::TimedOut {
            self.promote(query, &result).await;
        }

        let answer = Answer::new(result, status, started);
        info!(
            status = %answer.status,
            confidence = answer.result.confidence(),
            latency_ms = answer.latency_ms,
            "Query answered"
        );
        answer
    }

    async fn answer_uncached(&self, query: &str, top_k_final: usize) -> (JudgedResult, AnswerStatus) {
        let tau = self.config.tau;

        let hits = match self.retriever.search(query, self.config.top_k_retrieval).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, treating as empty");
                Vec::new()
            }
        };

        if hits.is_empty() {
            info!("No context retrieved");
            return (JudgedResult::no_context(), AnswerStatus::NoContext);
        }

        let chunks = self.rerank(query, hits, top_k_final).await;
        let candidates = self.solvers.solve_configured(query, &chunks, tau).await;
        let (judged, verdict) = self.judge.judge_with_verdict(&candidates, tau);
        debug!(%verdict, "Judge verdict");

        let mut result = gate(judged, tau);

        if self.config.enable_verification {
            let verification = verify_answer(result.answer(), query, None);
            result = result.with_verification(verification);
        }

        let status = if result.is_refusal() {
            AnswerStatus::Refused
        } else {
            AnswerStatus::Answered
        };
        (result, status)
    }

    async fn rerank(&self, query: &str, hits: Vec<ContextChunk>, top_k: usize) -> Vec<ContextChunk> {
        // keep a copy so a reranker failure can fall back to retrieval order
        let fallback: Vec<ContextChunk> = hits.iter().take(top_k).cloned().collect();

        match self.reranker.rerank(query, hits, top_k).await {
            Ok(mut ranked) => {
                ranked.truncate(top_k);
                ranked
            }
            Err(e) => {
                warn!(error = %e, "Rerank failed, keeping retrieval order");
                fallback
            }
        }
    }

    async fn cache_lookup(&self, query: &str) -> Option<FactRecord> {
        let facts = Arc::clone(&self.facts);
        let query = query.to_string();

        match tokio::task::spawn_blocking(move || facts.lookup(&query)).await {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Fact lookup task failed");
                None
            }
        }
    }

    async fn promote(&self, query: &str, result: &JudgedResult) {
        if !self
            .facts
            .policy()
            .should_promote(result.confidence(), result.citations().len())
        {
            return;
        }

        let facts = Arc::clone(&self.facts);
        let question = query.to_string();
        let answer = result.answer().to_string();
        let citations = result.citations().to_vec();
        let confidence = result.confidence();

        let task = tokio::task::spawn_blocking(move || {
            facts.upsert_with_outcome(&question, &answer, &citations, confidence)
        });

        if self.config.background_promotion {
            spawn_promotion_watch(task);
            return;
        }

        match task.await {
            Ok(outcome) => debug!(outcome = outcome.as_str(), "Promotion finished"),
            Err(e) => error!(error = %e, "Promotion task failed"),
        }
    }
}

/// Detached: logs a panicked promotion and otherwise drops the outcome.
fn spawn_promotion_watch(task: tokio::task::JoinHandle<crate::cache::UpsertOutcome>) {
    tokio::spawn(async move {
        if let Err(e) = task.await {
            error!(error = %e, "Background promotion failed");
        }
    });
}
