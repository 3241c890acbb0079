//! The generation backend seam.
//!
//! Concrete providers live in `postspark-interaction`; the orchestrator only
//! sees this trait. Backend selection and fallback policy are external
//! configuration, not part of the core contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{Platform, Tone};
use crate::result::TokenUsage;

/// Structured hints handed to a backend alongside the rendered prompt.
///
/// All fields are optional so auxiliary calls (e.g. hashtag suggestion)
/// can leave them unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptHints {
    pub platform: Option<Platform>,
    pub tone: Option<Tone>,
    pub language: Option<String>,
    /// Soft character budget for the generated text.
    pub max_length: Option<u32>,
}

/// Backend-agnostic prompt: a system framing plus the user request.
///
/// Built deterministically from a `GenerationRequest`, so the same request
/// always produces the same prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub system: String,
    pub user: String,
    pub hints: PromptHints,
}

/// Raw text plus token accounting returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub text: String,
    pub usage: TokenUsage,
}

/// Raw failure shape a backend reports before classification.
///
/// These variants mirror what the transport layer can actually observe;
/// mapping them into the user-facing taxonomy is the classifier's job and
/// happens exactly once, in the orchestrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendFailure {
    /// Request never produced an HTTP response
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        timeout: bool,
        connect: bool,
    },

    /// Non-success HTTP status from the provider
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// No usable credentials were configured
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// The provider refused the request on content-policy grounds
    #[error("content rejected by provider: {0}")]
    ContentRejected(String),

    /// The provider answered 2xx but the body was not parseable
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Uniform contract every generation provider implements.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short provider identifier used in logs, e.g. "anthropic".
    fn name(&self) -> &str;

    /// Produces text for the given prompt, or a raw failure.
    ///
    /// One call, no internal retries; the caller owns retry policy.
    async fn generate(&self, prompt: &PromptRequest) -> Result<BackendResponse, BackendFailure>;
}
