//! Maps raw backend failures into the closed [`GenerationError`] taxonomy.
//!
//! The mapping is deterministic and total: a failure shape this module has
//! never seen becomes `unknown` (retryable, optimistic default) rather than
//! a panic or a passthrough of provider vocabulary.

use crate::backend::BackendFailure;
use crate::error::GenerationError;

/// Classifies one raw backend failure.
pub fn classify(failure: BackendFailure) -> GenerationError {
    match failure {
        BackendFailure::Transport { message, .. } => GenerationError::network(message),
        BackendFailure::MissingCredentials(message) => GenerationError::authentication(message),
        BackendFailure::ContentRejected(message) => GenerationError::content_blocked(message),
        BackendFailure::Http {
            status,
            message,
            retry_after_secs,
        } => match status {
            401 | 403 => GenerationError::authentication(message),
            429 => GenerationError::rate_limited(message, retry_after_secs),
            500..=599 => GenerationError::service_unavailable(message),
            _ => GenerationError::unknown(format!("unexpected status {status}: {message}")),
        },
        BackendFailure::MalformedResponse(message) => GenerationError::unknown(message),
    }
}

impl From<BackendFailure> for GenerationError {
    fn from(failure: BackendFailure) -> Self {
        classify(failure)
    }
}
