//! Retrieval and rerank collaborators.
//!
//! The pipeline only consumes ordered [`ContextChunk`] lists. Key-name differences in the
//! search service (`id`/`doc_id`, `text`/`content`) are reconciled once, in
//! [`HttpRetriever`], so nothing downstream sees them.

pub mod error;
pub mod http;


use async_trait::async_trait;

use crate::answer::ContextChunk;

pub use error::{RetrievalError, RetrievalResult};
pub use http::{HttpRetriever, RawHit, parse_search_response};

#[async_trait]
/// First-stage search.
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> RetrievalResult<Vec<ContextChunk>>;
}

#[async_trait]
/// Second-stage reordering. May replace scores but keeps the chunk shape.
pub trait Reranker: Send + Sync {
    async fn rerank(
        &self,
        query: &str,
        chunks: Vec<ContextChunk>,
        top_k: usize,
    ) -> RetrievalResult<Vec<ContextChunk>>;
}

/// Returns a fixed chunk list for every query (first `top_k` entries).
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    chunks: Vec<ContextChunk>,
}

impl StaticRetriever {
    pub fn new(chunks: Vec<ContextChunk>) -> Self {
        Self { chunks }
    }

    /// A retriever that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> RetrievalResult<Vec<ContextChunk>> {
        Ok(self.chunks.iter().take(top_k).cloned().collect())
    }
}

/// Keeps retrieval order, truncated to `top_k`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughReranker;

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut chunks: Vec<ContextChunk>,
        top_k: usize,
    ) -> RetrievalResult<Vec<ContextChunk>> {
        chunks.truncate(top_k);
        Ok(chunks)
    }
}

/// Orders by score (descending, stable) and truncates to `top_k`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreReranker;

#[async_trait]
impl Reranker for ScoreReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut chunks: Vec<ContextChunk>,
        top_k: usize,
    ) -> RetrievalResult<Vec<ContextChunk>> {
        chunks.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        chunks.truncate(top_k);
        Ok(chunks)
    }
}
