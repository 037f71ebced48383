use crate::constants::{DEFAULT_PROMOTION_MIN_CITATIONS, DEFAULT_PROMOTION_MIN_CONFIDENCE};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Thresholds an answer must meet to be promoted into the fact store.
pub struct PromotionPolicy {
    pub min_confidence: f64,
    pub min_citations: usize,
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_PROMOTION_MIN_CONFIDENCE,
            min_citations: DEFAULT_PROMOTION_MIN_CITATIONS,
        }
    }
}

impl PromotionPolicy {
    pub fn new(min_confidence: f64, min_citations: usize) -> Self {
        Self {
            min_confidence,
            min_citations,
        }
    }

    #[inline]
    pub fn should_promote(&self, confidence: f64, citation_count: usize) -> bool {
        confidence >= self.min_confidence && citation_count >= self.min_citations
    }
}
