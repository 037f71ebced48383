use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::answer::{Candidate, JudgedResult};

use super::scorer::CandidateScorer;
use super::types::Verdict;

#[derive(Debug, Clone, Copy, Default)]
pub struct Judge {
    scorer: CandidateScorer,
}

impl Judge {
    pub fn new(scorer: CandidateScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &CandidateScorer {
        &self.scorer
    }

    pub fn judge(&self, candidates: &[Candidate], tau: f64) -> JudgedResult {
        self.judge_with_verdict(candidates, tau).0
    }

    /// Picks the best candidate and applies the evidence threshold.
    ///
    /// Ties keep the lower `solver_id`, regardless of the order candidates arrived in.
    pub fn judge_with_verdict(&self, candidates: &[Candidate], tau: f64) -> (JudgedResult, Verdict) {
        if candidates.is_empty() {
            warn!("Judge received no candidates");
            return (JudgedResult::refusal(0.0), Verdict::NoCandidates);
        }

        let mut scored: Vec<(f64, &Candidate)> = candidates
            .iter()
            .map(|c| (self.scorer.score(c), c))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.solver_id().cmp(&b.1.solver_id()))
        });

        // non-empty: checked above and scored maps 1:1
        let (best_score, best) = scored[0];

        debug!(
            num_candidates = candidates.len(),
            best_score,
            solver_id = best.solver_id(),
            confidence = best.confidence(),
            tau,
            "Ranked candidates"
        );

        if best.confidence() < tau {
            info!(
                confidence = best.confidence(),
                tau, "Best candidate below evidence threshold - refusing"
            );
            return (
                JudgedResult::refusal(best.confidence()),
                Verdict::BelowThreshold {
                    best_confidence: best.confidence(),
                },
            );
        }

        if best.is_refusal() {
            info!(solver_id = best.solver_id(), "Best candidate is an explicit refusal");
            return (JudgedResult::from_candidate(best), Verdict::ExplicitRefusal);
        }

        info!(
            solver_id = best.solver_id(),
            score = best_score,
            confidence = best.confidence(),
            "Candidate accepted"
        );
        (
            JudgedResult::from_candidate(best),
            Verdict::Accepted { score: best_score },
        )
    }
}

/// Judges with the default scorer.
pub fn judge(candidates: &[Candidate], tau: f64) -> JudgedResult {
    Judge::default().judge(candidates, tau)
}
