use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Social network the content is targeted at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Instagram,
    Twitter,
    Facebook,
    Linkedin,
    Tiktok,
    Youtube,
}

/// Shape of the content to produce.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    Post,
    VideoScript,
    Story,
    Caption,
    Thread,
}

/// Voice the generated text should carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tone {
    Casual,
    Professional,
    Humorous,
    Inspirational,
    Informative,
}

/// What the content is meant to achieve.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Goal {
    Engagement,
    Awareness,
    Conversion,
    Community,
    Traffic,
}

/// Stylistic switches applied during prompt construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylisticFlags {
    pub emojis: bool,
    pub hashtags: bool,
    pub short_sentences: bool,
}

impl Default for StylisticFlags {
    fn default() -> Self {
        Self {
            emojis: true,
            hashtags: true,
            short_sentences: false,
        }
    }
}

/// Immutable description of one piece of content to generate.
///
/// Built once by [`super::RequestDraft::build`] after the wizard's step
/// predicates hold; never mutated afterward. The full field set determines
/// the cache fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub platform: Platform,
    pub content_type: ContentType,
    pub tone: Tone,
    pub goal: Goal,
    /// Ordered talking points; order is meaningful for prompt construction.
    pub key_points: Vec<String>,
    /// BCP-47 style locale code, e.g. "en" or "de-AT".
    pub language: String,
    pub style: StylisticFlags,
    pub use_cache: bool,
}

impl GenerationRequest {
    /// Defensive re-check of the invariants the wizard already enforced.
    ///
    /// The pipeline calls this before doing any work so that a request
    /// assembled outside the wizard fails fast with `validation_error`.
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(GenerationError::validation("topic must not be empty"));
        }
        if self.language.trim().is_empty() {
            return Err(GenerationError::validation("language must not be empty"));
        }
        Ok(())
    }
}
