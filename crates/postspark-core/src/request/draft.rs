use serde::{Deserialize, Serialize};

use super::model::{ContentType, GenerationRequest, Goal, Platform, StylisticFlags, Tone};
use crate::error::{GenerationError, Result};

/// Partially-filled request accumulated across wizard steps.
///
/// Optional fields start empty and are merged in via [`DraftPatch`];
/// defaulted fields (`language`, `style`, `use_cache`) are always present
/// so the review step can render them without unwrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub content_type: Option<ContentType>,
    pub topic: String,
    pub platform: Option<Platform>,
    pub tone: Option<Tone>,
    pub goal: Option<Goal>,
    pub key_points: Vec<String>,
    pub language: String,
    pub style: StylisticFlags,
    pub use_cache: bool,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            content_type: None,
            topic: String::new(),
            platform: None,
            tone: None,
            goal: None,
            key_points: Vec::new(),
            language: "en".to_string(),
            style: StylisticFlags::default(),
            use_cache: true,
        }
    }
}

impl RequestDraft {
    /// Merges a patch into the draft, last write wins per field.
    ///
    /// No validation happens here; step predicates are recomputed by the
    /// wizard after every merge.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(content_type) = patch.content_type {
            self.content_type = Some(content_type);
        }
        if let Some(topic) = patch.topic {
            self.topic = topic;
        }
        if let Some(platform) = patch.platform {
            self.platform = Some(platform);
        }
        if let Some(tone) = patch.tone {
            self.tone = Some(tone);
        }
        if let Some(goal) = patch.goal {
            self.goal = Some(goal);
        }
        if let Some(key_points) = patch.key_points {
            self.key_points = key_points;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(use_cache) = patch.use_cache {
            self.use_cache = use_cache;
        }
    }

    /// Freezes the draft into an immutable [`GenerationRequest`].
    ///
    /// # Errors
    ///
    /// Returns `validation_error` naming the first missing field when the
    /// step 1-3 invariants do not hold. Key points (step 4) are optional
    /// and never block.
    pub fn build(&self) -> Result<GenerationRequest> {
        let content_type = self
            .content_type
            .ok_or_else(|| GenerationError::validation("content type not selected"))?;
        if self.topic.trim().is_empty() {
            return Err(GenerationError::validation("topic must not be empty"));
        }
        let platform = self
            .platform
            .ok_or_else(|| GenerationError::validation("platform not selected"))?;
        let tone = self
            .tone
            .ok_or_else(|| GenerationError::validation("tone not selected"))?;
        let goal = self
            .goal
            .ok_or_else(|| GenerationError::validation("goal not selected"))?;

        Ok(GenerationRequest {
            topic: self.topic.trim().to_string(),
            platform,
            content_type,
            tone,
            goal,
            key_points: self.key_points.clone(),
            language: self.language.clone(),
            style: self.style,
            use_cache: self.use_cache,
        })
    }
}

/// Field-wise update for a [`RequestDraft`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub content_type: Option<ContentType>,
    pub topic: Option<String>,
    pub platform: Option<Platform>,
    pub tone: Option<Tone>,
    pub goal: Option<Goal>,
    pub key_points: Option<Vec<String>>,
    pub language: Option<String>,
    pub style: Option<StylisticFlags>,
    pub use_cache: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_last_write_wins() {
        let mut draft = RequestDraft::default();
        draft.apply(DraftPatch {
            topic: Some("first".to_string()),
            ..DraftPatch::default()
        });
        draft.apply(DraftPatch {
            topic: Some("second".to_string()),
            ..DraftPatch::default()
        });

        assert_eq!(draft.topic, "second");
        // Untouched fields keep their defaults
        assert!(draft.use_cache);
        assert_eq!(draft.language, "en");
    }

    #[test]
    fn test_build_requires_steps_one_to_three() {
        let mut draft = RequestDraft::default();
        assert!(draft.build().is_err());

        draft.content_type = Some(ContentType::Post);
        draft.topic = "product launch".to_string();
        draft.platform = Some(Platform::Instagram);
        assert!(draft.build().is_err()); // tone and goal still missing

        draft.tone = Some(Tone::Casual);
        draft.goal = Some(Goal::Engagement);
        let request = draft.build().unwrap();
        assert_eq!(request.topic, "product launch");
        assert!(request.key_points.is_empty());
    }

    #[test]
    fn test_build_never_blocks_on_key_points() {
        let mut draft = RequestDraft::default();
        draft.content_type = Some(ContentType::Story);
        draft.topic = "weekly recap".to_string();
        draft.platform = Some(Platform::Tiktok);
        draft.tone = Some(Tone::Humorous);
        draft.goal = Some(Goal::Community);

        assert!(draft.build().is_ok());

        draft.key_points = vec!["point".to_string()];
        assert!(draft.build().is_ok());
    }
}
