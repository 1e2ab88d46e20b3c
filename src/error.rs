//! TutorHive error types and classification.
//!
//! Every failure a provider integration can produce is classified here,
//! at the point of origin, into one of a small set of kinds. Downstream
//! logic (retry executor, fallback orchestrator) matches on the kind and
//! never inspects vendor-specific error shapes.

use std::time::Duration;

/// TutorHive error types.
#[derive(Debug, thiserror::Error)]
pub enum TutorHiveError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Data errors
    #[error("unparseable provider payload: {0}")]
    Parse(String),

    #[error("empty response from provider")]
    EmptyResponse,

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    /// Provider is disabled or missing credentials. The orchestrator
    /// skips it without spending a network call.
    #[error("provider '{0}' is not available")]
    ProviderUnavailable(String),

    #[error("unknown provider key: {0}")]
    UnknownProvider(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Admission control
    #[error("{limit} limit exceeded, retry in {retry_after_secs}s")]
    QuotaExceeded {
        limit: String,
        retry_after_secs: u64,
    },

    // Shared store errors — always handled fail-open by cache/limiter,
    // never surfaced to facade callers.
    #[error("store unavailable: {0}")]
    Store(String),

    /// Every provider in the priority list failed. The only hard failure
    /// the facade produces.
    #[error("all providers failed for operation '{operation}'")]
    AllProvidersFailed {
        operation: String,
        #[source]
        last: Box<TutorHiveError>,
    },
}

impl TutorHiveError {
    /// Whether the retry executor may attempt this call again.
    ///
    /// Timeout/connection failures, 5xx-class API errors, and payload
    /// parse glitches are retryable. Rate limits are not retried locally
    /// (the orchestrator moves straight to the next provider), and
    /// auth/validation-class errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            TutorHiveError::Http(_) => true,
            TutorHiveError::Api { status, .. } => *status >= 500 || *status == 408,
            TutorHiveError::Parse(_) => true,
            TutorHiveError::EmptyResponse => true,
            _ => false,
        }
    }

    /// Whether this is a provider-signaled quota exhaustion.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TutorHiveError::RateLimited { .. })
    }

    /// Provider-supplied retry-after hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TutorHiveError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for TutorHive operations.
pub type Result<T> = std::result::Result<T, TutorHiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(TutorHiveError::Http("connection reset".into()).is_retryable());
        assert!(
            TutorHiveError::Api {
                status: 503,
                message: "overloaded".into()
            }
            .is_retryable()
        );
        assert!(TutorHiveError::Parse("not json".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!TutorHiveError::AuthenticationFailed.is_retryable());
        assert!(!TutorHiveError::InvalidInput("bad".into()).is_retryable());
        assert!(
            !TutorHiveError::Api {
                status: 404,
                message: "nope".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn rate_limit_is_not_retryable_locally() {
        let err = TutorHiveError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(!err.is_retryable());
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }
}
