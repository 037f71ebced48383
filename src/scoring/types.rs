use crate::answer::AnswerStatus;

#[derive(Debug, Clone, PartialEq)]
/// Why the judge picked what it picked.
pub enum Verdict {
    /// Best candidate cleared the threshold.
    Accepted {
        /// Quality score of the winner.
        score: f64,
    },
    /// Best candidate's confidence was below the threshold.
    BelowThreshold {
        /// Confidence carried on the refusal.
        best_confidence: f64,
    },
    /// Best candidate was itself a refusal.
    ExplicitRefusal,
    /// No candidates were provided.
    NoCandidates,
}

impl Verdict {
    /// Maps the verdict to an [`AnswerStatus`].
    pub fn to_status(&self) -> AnswerStatus {
        match self {
            Verdict::Accepted { .. } => AnswerStatus::Answered,
            Verdict::BelowThreshold { .. } | Verdict::ExplicitRefusal | Verdict::NoCandidates => {
                AnswerStatus::Refused
            }
        }
    }

    /// Returns `true` if accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }

    /// Returns the score or confidence the verdict carries (if any).
    pub fn value(&self) -> Option<f64> {
        match self {
            Verdict::Accepted { score } => Some(*score),
            Verdict::BelowThreshold { best_confidence } => Some(*best_confidence),
            Verdict::ExplicitRefusal | Verdict::NoCandidates => None,
        }
    }

    /// Returns a short debug string.
    pub fn debug_status(&self) -> &'static str {
        match self {
            Verdict::Accepted { .. } => "ACCEPTED",
            Verdict::BelowThreshold { .. } => "BELOW_THRESHOLD",
            Verdict::ExplicitRefusal => "EXPLICIT_REFUSAL",
            Verdict::NoCandidates => "NO_CANDIDATES",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accepted { score } => write!(f, "ACCEPTED (score: {:.4})", score),
            Verdict::BelowThreshold { best_confidence } => {
                write!(f, "BELOW_THRESHOLD (best_confidence: {:.4})", best_confidence)
            }
            Verdict::ExplicitRefusal => write!(f, "EXPLICIT_REFUSAL"),
            Verdict::NoCandidates => write!(f, "NO_CANDIDATES"),
        }
    }
}
