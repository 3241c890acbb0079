//! Output of a completed generation.

use serde::{Deserialize, Serialize};

use crate::request::{ContentType, Platform};

/// Token accounting reported by the backend for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_units: u32,
    pub completion_units: u32,
    pub total_units: u32,
}

impl TokenUsage {
    pub fn new(prompt_units: u32, completion_units: u32) -> Self {
        Self {
            prompt_units,
            completion_units,
            total_units: prompt_units + completion_units,
        }
    }
}

/// Provenance attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub platform: Platform,
    pub content_type: ContentType,
    pub generated_at_ms: i64,
    pub prompt_version: String,
}

/// A finished generation: primary content plus best-effort enrichment.
///
/// Immutable once produced. `cached = true` means the result was served
/// from the cache layer, no backend call happened and no quota unit was
/// consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub hashtags: Vec<String>,
    pub cached: bool,
    pub usage: TokenUsage,
    pub metadata: ResultMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_totals() {
        let usage = TokenUsage::new(120, 480);
        assert_eq!(usage.total_units, 600);
    }
}
