use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt fact record at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("invalid fact key: {key}")]
    InvalidKey { key: String },

    #[error("fact storage unavailable at {path}")]
    StorageUnavailable { path: PathBuf },
}

pub type FactStoreResult<T> = Result<T, FactStoreError>;
