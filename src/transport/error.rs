use thiserror::Error;

use super::types::AttemptFailure;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("LLM call failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: AttemptFailure },

    #[error("LLM call failed without retry: {0}")]
    Fatal(AttemptFailure),
}

impl TransportError {
    /// The underlying failure of the last attempt.
    pub fn last_failure(&self) -> &AttemptFailure {
        match self {
            TransportError::Exhausted { last, .. } => last,
            TransportError::Fatal(failure) => failure,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
