//! Candidate scoring, judging and the evidence gate.
//!
//! The scorer is a pure weighting of confidence and citation count. The judge ranks
//! candidates by that score and refuses when the winner's confidence is below the evidence
//! threshold `tau`. [`gate`] applies the same threshold on its own so it can be re-run
//! after any later stage without changing an already-gated result.
//!
//! # Tie-breaking
//!
//! Solvers may finish in any order. The judge never relies on arrival order: equal scores
//! are broken by `solver_id` (generation index), lowest first.

pub mod gate;
pub mod judge;
pub mod scorer;
pub mod types;


pub use gate::gate;
pub use judge::{Judge, judge};
pub use scorer::{CandidateScorer, ScoreWeights, score};
pub use types::Verdict;
