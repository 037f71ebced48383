use crate::answer::Candidate;
use crate::constants::{CITATION_SATURATION, CITATION_WEIGHT, CONFIDENCE_WEIGHT};

/// Weights of the candidate quality score.
///
/// `score = confidence_weight * confidence
///        + citation_weight * min(citations / citation_saturation, 1.0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub confidence_weight: f64,
    pub citation_weight: f64,
    pub citation_saturation: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            confidence_weight: CONFIDENCE_WEIGHT,
            citation_weight: CITATION_WEIGHT,
            citation_saturation: CITATION_SATURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateScorer {
    weights: ScoreWeights,
}

impl CandidateScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    #[inline]
    pub fn score_parts(&self, confidence: f64, citation_count: usize) -> f64 {
        let citation_term = if self.weights.citation_saturation > 0.0 {
            (citation_count as f64 / self.weights.citation_saturation).min(1.0)
        } else {
            1.0
        };
        self.weights.confidence_weight * confidence + self.weights.citation_weight * citation_term
    }

    #[inline]
    pub fn score(&self, candidate: &Candidate) -> f64 {
        self.score_parts(candidate.confidence(), candidate.citations().len())
    }
}

/// Scores a candidate with the default weights. Result is in `[0.0, 1.0]`.
#[inline]
pub fn score(candidate: &Candidate) -> f64 {
    CandidateScorer::default().score(candidate)
}
