use std::time::Duration;

use crate::constants::{
    DEFAULT_EVIDENCE_TAU, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_K_FINAL,
    DEFAULT_TOP_K_RETRIEVAL,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Evidence threshold.
    pub tau: f64,
    pub top_k_retrieval: usize,
    pub top_k_final: usize,
    pub enable_verification: bool,
    /// Budget for the cache-miss path.
    pub request_timeout: Duration,
    /// Promote on a detached task instead of before responding.
    pub background_promotion: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tau: DEFAULT_EVIDENCE_TAU,
            top_k_retrieval: DEFAULT_TOP_K_RETRIEVAL,
            top_k_final: DEFAULT_TOP_K_FINAL,
            enable_verification: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            background_promotion: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.enable_verification = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_background_promotion(mut self, enabled: bool) -> Self {
        self.background_promotion = enabled;
        self
    }
}
