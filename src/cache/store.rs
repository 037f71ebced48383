use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::answer::dedup_citations;
use crate::constants::clamp_confidence;
use crate::hashing::{question_key, short_key};

use super::backend::FactBackend;
use super::disk::DiskFactBackend;
use super::error::FactStoreResult;
use super::memory::MemoryFactBackend;
use super::policy::PromotionPolicy;
use super::types::{FactRecord, FactStats, UpsertOutcome, rank_facts};

/// Hash-keyed answer cache with monotonic-confidence promotion.
///
/// Storage errors never escape: lookups degrade to misses and writes to `false`.
#[derive(Clone)]
pub struct FactStore {
    backend: Arc<dyn FactBackend>,
    policy: PromotionPolicy,
}

impl std::fmt::Debug for FactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactStore")
            .field("backend", &self.backend.kind())
            .field("policy", &self.policy)
            .finish()
    }
}

impl FactStore {
    pub fn new(backend: Arc<dyn FactBackend>, policy: PromotionPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryFactBackend::new()), PromotionPolicy::default())
    }

    /// Opens a durable store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> FactStoreResult<Self> {
        let backend = DiskFactBackend::open(root)?;
        Ok(Self::new(Arc::new(backend), PromotionPolicy::default()))
    }

    pub fn with_policy(mut self, policy: PromotionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PromotionPolicy {
        &self.policy
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Returns the cached record for `question`, counting the hit.
    pub fn lookup(&self, question: &str) -> Option<FactRecord> {
        let key = question_key(question);
        let now = chrono::Utc::now().timestamp();

        match self.backend.get_and_touch(&key, now) {
            Ok(Some(record)) => {
                info!(
                    q_hash = short_key(&key),
                    confidence = record.confidence,
                    access_count = record.access_count,
                    "Fact cache hit"
                );
                Some(record)
            }
            Ok(None) => {
                debug!(q_hash = short_key(&key), "Fact cache miss");
                None
            }
            Err(e) => {
                error!(q_hash = short_key(&key), error = %e, "Fact lookup failed, treating as miss");
                None
            }
        }
    }

    /// Promotes an answer. Returns `true` only if the store now holds it.
    pub fn upsert(&self, question: &str, answer: &str, citations: &[String], confidence: f64) -> bool {
        self.upsert_with_outcome(question, answer, citations, confidence)
            .is_stored()
    }

    pub fn upsert_with_outcome(
        &self,
        question: &str,
        answer: &str,
        citations: &[String],
        confidence: f64,
    ) -> UpsertOutcome {
        let citations = dedup_citations(citations.iter().cloned());
        let confidence = clamp_confidence(confidence);
        let key = question_key(question);

        if !self.policy.should_promote(confidence, citations.len()) {
            debug!(
                q_hash = short_key(&key),
                confidence,
                citations = citations.len(),
                "Answer below promotion thresholds"
            );
            return UpsertOutcome::Rejected;
        }

        let now = chrono::Utc::now().timestamp();
        let record = FactRecord::new(key.clone(), question, answer, citations, confidence, now);

        match self.backend.upsert(record) {
            Ok(outcome) => {
                info!(
                    q_hash = short_key(&key),
                    confidence,
                    outcome = outcome.as_str(),
                    "Fact promotion processed"
                );
                outcome
            }
            Err(e) => {
                error!(q_hash = short_key(&key), error = %e, "Fact promotion failed");
                UpsertOutcome::Failed
            }
        }
    }

    pub fn stats(&self) -> FactStats {
        match self.backend.records() {
            Ok(records) => FactStats::from_records(&records),
            Err(e) => {
                error!(error = %e, "Failed to read fact stats");
                FactStats::default()
            }
        }
    }

    /// Records with `confidence >= min_confidence`, most confident first.
    pub fn list(&self, limit: usize, min_confidence: f64) -> Vec<FactRecord> {
        match self.backend.records() {
            Ok(records) => rank_facts(records, limit, min_confidence),
            Err(e) => {
                error!(error = %e, "Failed to list facts");
                Vec::new()
            }
        }
    }
}
