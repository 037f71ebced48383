use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::FactStore;
use crate::constants::DEFAULT_MAX_QUERY_TOKENS;
use crate::orchestrator::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    pub facts: Arc<FactStore>,

    /// Fact store root; `None` for an in-memory store.
    pub storage_path: Option<PathBuf>,

    pub max_query_tokens: usize,

    pub llm_stub: bool,

    pub retrieval_configured: bool,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let facts = Arc::clone(orchestrator.facts());
        Self {
            orchestrator,
            facts,
            storage_path: None,
            max_query_tokens: DEFAULT_MAX_QUERY_TOKENS,
            llm_stub: true,
            retrieval_configured: false,
        }
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn with_max_query_tokens(mut self, max_query_tokens: usize) -> Self {
        self.max_query_tokens = max_query_tokens;
        self
    }

    pub fn with_llm_stub(mut self, llm_stub: bool) -> Self {
        self.llm_stub = llm_stub;
        self
    }

    pub fn with_retrieval_configured(mut self, configured: bool) -> Self {
        self.retrieval_configured = configured;
        self
    }
}
