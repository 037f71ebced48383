pub const ARBITER_STATUS_HEADER: &str = "X-Arbiter-Status";
pub const ARBITER_STATUS_HEALTHY: &str = "healthy";
pub const ARBITER_STATUS_READY: &str = "ready";
pub const ARBITER_STATUS_NOT_READY: &str = "not_ready";
pub const ARBITER_STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerStatus {
    CacheHit,
    Answered,
    Refused,
    NoContext,
    TimedOut,
}

impl AnswerStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            AnswerStatus::CacheHit => "CACHE_HIT",
            AnswerStatus::Answered => "ANSWERED",
            AnswerStatus::Refused => "REFUSED",
            AnswerStatus::NoContext => "NO_CONTEXT",
            AnswerStatus::TimedOut => "TIMED_OUT",
        }
    }

    #[inline]
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, AnswerStatus::CacheHit)
    }
}

impl std::fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
