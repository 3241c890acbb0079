//! Provider backends implementing the `GenerationBackend` contract.
//!
//! Each backend calls its provider's HTTP API directly and reports raw
//! [`postspark_core::backend::BackendFailure`] shapes; classification into
//! the user-facing taxonomy happens in the orchestrator.

pub mod anthropic_backend;
pub mod openai_backend;
pub mod supported_models;

use std::sync::Arc;

use postspark_core::backend::GenerationBackend;
use postspark_core::classify::classify;
use postspark_core::config::ProviderKind;
use postspark_core::error::Result;

pub use anthropic_backend::AnthropicBackend;
pub use openai_backend::OpenAiBackend;

/// Constructs the configured provider backend from secrets/environment.
///
/// Selection across providers is a configuration concern; this honors the
/// single preferred provider and nothing more. Fallback chains belong to
/// the caller.
pub fn backend_from_env(provider: ProviderKind) -> Result<Arc<dyn GenerationBackend>> {
    match provider {
        ProviderKind::Anthropic => AnthropicBackend::try_from_env()
            .map(|backend| Arc::new(backend) as Arc<dyn GenerationBackend>)
            .map_err(classify),
        ProviderKind::OpenAi => OpenAiBackend::try_from_env()
            .map(|backend| Arc::new(backend) as Arc<dyn GenerationBackend>)
            .map_err(classify),
    }
}
