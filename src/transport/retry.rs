use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::constants::DEFAULT_LLM_MAX_RETRIES;

use super::error::{TransportError, TransportResult};
use super::types::{AttemptFailure, ChatRequest, FailureClass};
use super::{ChatExchange, ChatTransport};

const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const BACKOFF_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What to do after a failed attempt.
pub enum RetryDecision {
    /// Sleep for `delay`, then try again.
    Retry { delay: Duration },
    /// Fatal failure: stop now.
    Abort,
    /// No attempts left.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_LLM_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Decides the next step after attempt number `attempt` (1-based) failed.
    ///
    /// `backoff` is the current backoff; a 429 uses the provider's `Retry-After` instead
    /// when present.
    pub fn decide(&self, failure: &AttemptFailure, attempt: u32, backoff: Duration) -> RetryDecision {
        if failure.is_fatal() {
            return RetryDecision::Abort;
        }
        if attempt >= self.max_attempts() {
            return RetryDecision::Exhausted;
        }
        match failure.class {
            FailureClass::RateLimited { retry_after } => RetryDecision::Retry {
                delay: retry_after.unwrap_or(backoff),
            },
            _ => RetryDecision::Retry { delay: backoff },
        }
    }

    #[inline]
    pub fn next_backoff(&self, backoff: Duration) -> Duration {
        backoff.saturating_mul(BACKOFF_MULTIPLIER)
    }
}

/// Wraps a single-attempt [`ChatExchange`] with bounded retries and exponential backoff.
pub struct RetryingTransport<E> {
    exchange: E,
    policy: RetryPolicy,
}

impl<E: ChatExchange> RetryingTransport<E> {
    pub fn new(exchange: E, policy: RetryPolicy) -> Self {
        Self { exchange, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for RetryingTransport<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingTransport")
            .field("exchange", &self.exchange)
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl<E: ChatExchange> ChatTransport for RetryingTransport<E> {
    async fn send(&self, request: &ChatRequest) -> TransportResult<String> {
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let failure = match self.exchange.exchange(request).await {
                Ok(text) => {
                    debug!(attempt, model = %request.model, "LLM call succeeded");
                    return Ok(text);
                }
                Err(failure) => failure,
            };

            match self.policy.decide(&failure, attempt, backoff) {
                RetryDecision::Abort => {
                    error!(attempt, status = ?failure.status(), error = %failure, "LLM call failed fatally");
                    return Err(TransportError::Fatal(failure));
                }
                RetryDecision::Exhausted => {
                    error!(attempts = attempt, error = %failure, "LLM call failed after all retries");
                    return Err(TransportError::Exhausted {
                        attempts: attempt,
                        last: failure,
                    });
                }
                RetryDecision::Retry { delay } => {
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "LLM call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    backoff = self.policy.next_backoff(backoff);
                }
            }
        }
    }
}
