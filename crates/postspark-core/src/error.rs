//! Error types for the PostSpark generation core.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the generation workflow.
///
/// Every failure a caller can observe is one of these closed variants.
/// Each variant carries a technical message suitable for logs; the
/// [`GenerationError::user_message`] accessor produces a displayable
/// counterpart that never leaks provider-specific vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationError {
    /// Transport-level failure while reaching a generation backend
    #[error("Network error: {message}")]
    Network { message: String },

    /// Missing or rejected credentials, or an unauthenticated caller
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Backend-reported rate limiting, with an optional cooldown
    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// The caller's monthly generation quota is exhausted
    #[error("Generation quota exceeded: {used}/{limit} used this period")]
    QuotaExceeded { used: u32, limit: u32 },

    /// Backend unreachable or answering with a server error
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The backend declined the request on content-policy grounds
    #[error("Content blocked: {message}")]
    ContentBlocked { message: String },

    /// The request failed local shape validation
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// Identity or scoping violation
    #[error("Security error: {message}")]
    Security { message: String },

    /// Anything that does not fit the taxonomy above
    #[error("Generation failed: {message}")]
    Unknown { message: String },
}

/// Discriminant-only view of [`GenerationError`], stable across wire formats.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Authentication,
    RateLimit,
    QuotaExceeded,
    ServiceUnavailable,
    ContentBlocked,
    ValidationError,
    SecurityError,
    Unknown,
}

impl GenerationError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an Authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a RateLimit error with an optional cooldown in seconds
    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after_secs,
        }
    }

    /// Creates a QuotaExceeded error
    pub fn quota_exceeded(used: u32, limit: u32) -> Self {
        Self::QuotaExceeded { used, limit }
    }

    /// Creates a ServiceUnavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a ContentBlocked error
    pub fn content_blocked(message: impl Into<String>) -> Self {
        Self::ContentBlocked {
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a Security error
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
        }
    }

    /// Creates an Unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    // ============================================================================
    // Classification accessors
    // ============================================================================

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::ContentBlocked { .. } => ErrorKind::ContentBlocked,
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::Security { .. } => ErrorKind::SecurityError,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether re-invoking the same operation with unchanged inputs may succeed.
    ///
    /// Retries are always a caller decision; the pipeline itself never
    /// retries internally.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Network { .. }
            | Self::RateLimit { .. }
            | Self::ServiceUnavailable { .. }
            | Self::Unknown { .. } => true,
            Self::Authentication { .. }
            | Self::QuotaExceeded { .. }
            | Self::ContentBlocked { .. }
            | Self::Validation { .. }
            | Self::Security { .. } => false,
        }
    }

    /// Cooldown suggested by the backend before a retry, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit {
                retry_after_secs: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// Human-readable message safe to show in a UI.
    ///
    /// Always distinct from the technical `Display` output, which may carry
    /// raw backend vocabulary.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "We couldn't reach the generation service. Check your connection and try again."
            }
            Self::Authentication { .. } => {
                "Your session isn't authorized to generate content. Please sign in again."
            }
            Self::RateLimit { .. } => {
                "The generation service is busy right now. Please wait a moment and try again."
            }
            Self::QuotaExceeded { .. } => {
                "You've used all generations included in your plan this month. Upgrade your plan to keep creating."
            }
            Self::ServiceUnavailable { .. } => {
                "The generation service is temporarily unavailable. Please try again shortly."
            }
            Self::ContentBlocked { .. } => {
                "This request was declined by the content policy. Try rephrasing your topic."
            }
            Self::Validation { .. } => {
                "Some required fields are missing or invalid. Review your inputs and try again."
            }
            Self::Security { .. } => "This request was blocked for security reasons.",
            Self::Unknown { .. } => {
                "Something went wrong while generating your content. Please try again."
            }
        }
        .to_string()
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a QuotaExceeded error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is an Authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

/// A type alias for `Result<T, GenerationError>`.
pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_taxonomy() {
        assert!(GenerationError::network("boom").retryable());
        assert!(GenerationError::rate_limited("slow down", Some(30)).retryable());
        assert!(GenerationError::service_unavailable("502").retryable());
        assert!(GenerationError::unknown("?").retryable());

        assert!(!GenerationError::authentication("bad key").retryable());
        assert!(!GenerationError::quota_exceeded(5, 5).retryable());
        assert!(!GenerationError::content_blocked("policy").retryable());
        assert!(!GenerationError::validation("empty topic").retryable());
        assert!(!GenerationError::security("scope").retryable());
    }

    #[test]
    fn test_retry_after_only_on_rate_limit() {
        let limited = GenerationError::rate_limited("429", Some(12));
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(12)));

        assert_eq!(GenerationError::rate_limited("429", None).retry_after(), None);
        assert_eq!(GenerationError::network("down").retry_after(), None);
    }

    #[test]
    fn test_user_message_distinct_from_raw() {
        let err = GenerationError::network("connection reset by peer (os error 104)");
        assert_ne!(err.user_message(), err.to_string());
        assert!(!err.user_message().contains("os error"));
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(
            GenerationError::validation("x").kind().to_string(),
            "validation_error"
        );
        assert_eq!(
            GenerationError::quota_exceeded(1, 1).kind().to_string(),
            "quota_exceeded"
        );
        assert_eq!(GenerationError::unknown("x").kind().to_string(), "unknown");
    }
}
