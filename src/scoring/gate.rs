use tracing::info;

use crate::answer::JudgedResult;

/// Refuses any result whose confidence is below `tau`, keeping the confidence.
///
/// Idempotent: `gate(gate(r, tau), tau) == gate(r, tau)`.
pub fn gate(result: JudgedResult, tau: f64) -> JudgedResult {
    if result.confidence() < tau {
        if !result.is_refusal() {
            info!(
                confidence = result.confidence(),
                tau, "Evidence gate refused answer"
            );
        }
        result.into_refusal()
    } else {
        result
    }
}
