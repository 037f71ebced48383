//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `ARBITER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EVIDENCE_TAU, DEFAULT_LLM_MAX_RETRIES, DEFAULT_LLM_TIMEOUT_SECS,
    DEFAULT_MAX_QUERY_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SOLVER_MODEL,
    DEFAULT_SOLVERS, DEFAULT_TOP_K_FINAL, DEFAULT_TOP_K_RETRIEVAL, validate_unit_interval,
};
use crate::orchestrator::PipelineConfig;
use crate::solver::SolverConfig;
use crate::transport::{DEFAULT_LLM_ENDPOINT, RetryPolicy};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ARBITER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Fact store root directory. Default: `./.data/facts`.
    pub storage_path: PathBuf,

    /// Answer with the offline stub instead of calling the LLM.
    /// Default: `true` unless an API key is set.
    pub llm_stub: bool,

    pub llm_endpoint: String,

    pub llm_api_key: Option<String>,

    /// Per-call LLM timeout. Default: 60s.
    pub llm_timeout: Duration,

    /// Total attempts per LLM call. Default: `3`.
    pub llm_max_retries: u32,

    pub solver_model: String,

    /// Candidates per query. Default: `3`.
    pub solvers: usize,

    /// When off, one candidate is generated. Default: `true`.
    pub multi_agent: bool,

    /// Evidence threshold τ. Default: `0.70`.
    pub evidence_tau: f64,

    pub top_k_retrieval: usize,

    pub top_k_final: usize,

    /// Attach a task-type verification note to answers. Default: `false`.
    pub enable_verification: bool,

    /// Budget for answering a cache miss. Default: 20s.
    pub request_timeout: Duration,

    /// Base URL of the search service. Unset means every query has no context.
    pub retrieval_url: Option<String>,

    /// Upper bound on whitespace-separated query tokens. Default: `256`.
    pub max_query_tokens: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data/facts"),
            llm_stub: true,
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            llm_api_key: None,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            llm_max_retries: DEFAULT_LLM_MAX_RETRIES,
            solver_model: DEFAULT_SOLVER_MODEL.to_string(),
            solvers: DEFAULT_SOLVERS,
            multi_agent: true,
            evidence_tau: DEFAULT_EVIDENCE_TAU,
            top_k_retrieval: DEFAULT_TOP_K_RETRIEVAL,
            top_k_final: DEFAULT_TOP_K_FINAL,
            enable_verification: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retrieval_url: None,
            max_query_tokens: DEFAULT_MAX_QUERY_TOKENS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ARBITER_PORT";
    const ENV_BIND_ADDR: &'static str = "ARBITER_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "ARBITER_STORAGE_PATH";
    const ENV_LLM_STUB: &'static str = "ARBITER_LLM_STUB";
    const ENV_LLM_ENDPOINT: &'static str = "ARBITER_LLM_ENDPOINT";
    const ENV_LLM_API_KEY: &'static str = "ARBITER_LLM_API_KEY";
    const ENV_LLM_TIMEOUT_SECS: &'static str = "ARBITER_LLM_TIMEOUT_SECS";
    const ENV_LLM_MAX_RETRIES: &'static str = "ARBITER_LLM_MAX_RETRIES";
    const ENV_SOLVER_MODEL: &'static str = "ARBITER_SOLVER_MODEL";
    const ENV_SOLVERS: &'static str = "ARBITER_SOLVERS";
    const ENV_MULTI_AGENT: &'static str = "ARBITER_MULTI_AGENT";
    const ENV_EVIDENCE_TAU: &'static str = "ARBITER_EVIDENCE_TAU";
    const ENV_TOP_K_RETRIEVAL: &'static str = "ARBITER_TOP_K_RETRIEVAL";
    const ENV_TOP_K_FINAL: &'static str = "ARBITER_TOP_K_FINAL";
    const ENV_ENABLE_VERIFICATION: &'static str = "ARBITER_ENABLE_VERIFICATION";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "ARBITER_REQUEST_TIMEOUT_SECS";
    const ENV_RETRIEVAL_URL: &'static str = "ARBITER_RETRIEVAL_URL";
    const ENV_MAX_QUERY_TOKENS: &'static str = "ARBITER_MAX_QUERY_TOKENS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let llm_api_key = Self::parse_optional_string_from_env(Self::ENV_LLM_API_KEY);
        let llm_stub = Self::parse_bool_from_env(Self::ENV_LLM_STUB, llm_api_key.is_none())?;
        let llm_endpoint =
            Self::parse_string_from_env(Self::ENV_LLM_ENDPOINT, defaults.llm_endpoint);
        let llm_timeout =
            Self::parse_secs_from_env(Self::ENV_LLM_TIMEOUT_SECS, defaults.llm_timeout)?;
        let llm_max_retries =
            Self::parse_number_from_env(Self::ENV_LLM_MAX_RETRIES, defaults.llm_max_retries)?;
        let solver_model = Self::parse_string_from_env(Self::ENV_SOLVER_MODEL, defaults.solver_model);
        let solvers = Self::parse_number_from_env(Self::ENV_SOLVERS, defaults.solvers)?;
        let multi_agent = Self::parse_bool_from_env(Self::ENV_MULTI_AGENT, defaults.multi_agent)?;
        let evidence_tau =
            Self::parse_number_from_env(Self::ENV_EVIDENCE_TAU, defaults.evidence_tau)?;
        let top_k_retrieval =
            Self::parse_number_from_env(Self::ENV_TOP_K_RETRIEVAL, defaults.top_k_retrieval)?;
        let top_k_final = Self::parse_number_from_env(Self::ENV_TOP_K_FINAL, defaults.top_k_final)?;
        let enable_verification = Self::parse_bool_from_env(
            Self::ENV_ENABLE_VERIFICATION,
            defaults.enable_verification,
        )?;
        let request_timeout =
            Self::parse_secs_from_env(Self::ENV_REQUEST_TIMEOUT_SECS, defaults.request_timeout)?;
        let retrieval_url = Self::parse_optional_string_from_env(Self::ENV_RETRIEVAL_URL);
        let max_query_tokens =
            Self::parse_number_from_env(Self::ENV_MAX_QUERY_TOKENS, defaults.max_query_tokens)?;

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            llm_stub,
            llm_endpoint,
            llm_api_key,
            llm_timeout,
            llm_max_retries,
            solver_model,
            solvers,
            multi_agent,
            evidence_tau,
            top_k_retrieval,
            top_k_final,
            enable_verification,
            request_timeout,
            retrieval_url,
            max_query_tokens,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        validate_unit_interval("evidence_tau", self.evidence_tau)?;

        if self.solvers == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SOLVERS,
                value: "0".to_string(),
                reason: "at least one solver is required",
            });
        }

        if self.llm_max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_LLM_MAX_RETRIES,
                value: "0".to_string(),
                reason: "at least one attempt is required",
            });
        }

        if self.top_k_retrieval == 0 || self.top_k_final == 0 {
            return Err(ConfigError::InvalidValue {
                name: if self.top_k_retrieval == 0 {
                    Self::ENV_TOP_K_RETRIEVAL
                } else {
                    Self::ENV_TOP_K_FINAL
                },
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }

        for (name, timeout) in [
            (Self::ENV_LLM_TIMEOUT_SECS, self.llm_timeout),
            (Self::ENV_REQUEST_TIMEOUT_SECS, self.request_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: "0".to_string(),
                    reason: "timeout must be at least one second",
                });
            }
        }

        if !self.llm_stub && self.llm_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_LLM_API_KEY,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            solvers: self.solvers,
            multi_agent: self.multi_agent,
            model: self.solver_model.clone(),
            timeout: self.llm_timeout,
            ..SolverConfig::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.llm_max_retries,
            ..RetryPolicy::default()
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            tau: self.evidence_tau,
            top_k_retrieval: self.top_k_retrieval,
            top_k_final: self.top_k_final,
            enable_verification: self.enable_verification,
            request_timeout: self.request_timeout,
            ..PipelineConfig::default()
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T: std::str::FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "not a number",
            }),
            None => Ok(default),
        }
    }

    fn parse_secs_from_env(
        var_name: &'static str,
        default: Duration,
    ) -> Result<Duration, ConfigError> {
        Self::parse_number_from_env(var_name, default.as_secs()).map(Duration::from_secs)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };

        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "expected true/false",
            }),
        }
    }
}
