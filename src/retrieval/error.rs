use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search service returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid search response: {reason}")]
    InvalidResponse { reason: String },

    #[error("reranker failed: {reason}")]
    Rerank { reason: String },
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
