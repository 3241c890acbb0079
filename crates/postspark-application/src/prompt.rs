//! Deterministic, backend-agnostic prompt construction.
//!
//! The same request always renders the same prompt, which is what makes the
//! request fingerprint a sound cache key. Bump [`PROMPT_VERSION`] whenever
//! the template changes so downstream consumers can tell results apart.

use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use postspark_core::backend::{PromptHints, PromptRequest};
use postspark_core::error::{GenerationError, Result};
use postspark_core::request::{GenerationRequest, Platform};

/// Version tag recorded in every result's metadata.
pub const PROMPT_VERSION: &str = "v1";

const SYSTEM_PROMPT: &str = "You are a social media copywriter. You write platform-native content \
that sounds like a person, not a brand manual. You follow the requested tone, \
goal and language exactly and you never add commentary about your own output.";

const CONTENT_TEMPLATE: &str = r#"Create a {{ content_type }} for {{ platform }} about the following topic.

Topic: {{ topic }}
Tone: {{ tone }}
Goal: {{ goal }}
Language: {{ language }}
{% if char_limit %}Keep the text under {{ char_limit }} characters.
{% endif %}{% if key_points %}Cover these points in this order:
{% for point in key_points %}- {{ point }}
{% endfor %}{% endif %}Guidelines:
- Write naturally for the platform's audience
{% if emojis %}- Use fitting emojis sparingly
{% else %}- Do not use emojis
{% endif %}{% if hashtags %}- Weave in relevant hashtags where the platform rewards them
{% else %}- Do not include hashtags
{% endif %}{% if short_sentences %}- Prefer short, punchy sentences
{% endif %}- Provide only the content itself without explanations"#;

static PROMPT_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // The template is a compile-time constant; a registration failure would
    // surface as a render error below rather than a panic here.
    let _ = env.add_template("content", CONTENT_TEMPLATE);
    env
});

#[derive(Serialize)]
struct PromptContext<'a> {
    content_type: String,
    platform: String,
    topic: &'a str,
    tone: String,
    goal: String,
    language: &'a str,
    char_limit: Option<u32>,
    key_points: &'a [String],
    emojis: bool,
    hashtags: bool,
    short_sentences: bool,
}

/// Renders the prompt for a request.
pub fn build_prompt(request: &GenerationRequest) -> Result<PromptRequest> {
    let char_limit = platform_char_limit(request.platform);

    let context = PromptContext {
        content_type: request.content_type.to_string().replace('_', " "),
        platform: request.platform.to_string(),
        topic: &request.topic,
        tone: request.tone.to_string(),
        goal: request.goal.to_string(),
        language: &request.language,
        char_limit,
        key_points: &request.key_points,
        emojis: request.style.emojis,
        hashtags: request.style.hashtags,
        short_sentences: request.style.short_sentences,
    };

    let user = PROMPT_ENV
        .get_template("content")
        .and_then(|template| template.render(&context))
        .map_err(|err| GenerationError::unknown(format!("prompt rendering failed: {err}")))?;

    Ok(PromptRequest {
        system: SYSTEM_PROMPT.to_string(),
        user,
        hints: PromptHints {
            platform: Some(request.platform),
            tone: Some(request.tone),
            language: Some(request.language.clone()),
            max_length: char_limit,
        },
    })
}

/// Hard or practical character ceilings per network.
fn platform_char_limit(platform: Platform) -> Option<u32> {
    match platform {
        Platform::Twitter => Some(280),
        Platform::Instagram | Platform::Tiktok => Some(2200),
        Platform::Linkedin => Some(3000),
        Platform::Facebook | Platform::Youtube => Some(5000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postspark_core::request::{ContentType, Goal, StylisticFlags, Tone};

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "product launch".to_string(),
            platform: Platform::Twitter,
            content_type: ContentType::VideoScript,
            tone: Tone::Casual,
            goal: Goal::Engagement,
            key_points: vec!["price".to_string(), "date".to_string()],
            language: "en".to_string(),
            style: StylisticFlags::default(),
            use_cache: true,
        }
    }

    #[test]
    fn test_same_request_renders_same_prompt() {
        let first = build_prompt(&request()).unwrap();
        let second = build_prompt(&request()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prompt_mentions_every_driving_field() {
        let prompt = build_prompt(&request()).unwrap();
        assert!(prompt.user.contains("video script"));
        assert!(prompt.user.contains("twitter"));
        assert!(prompt.user.contains("product launch"));
        assert!(prompt.user.contains("casual"));
        assert!(prompt.user.contains("engagement"));
        assert!(prompt.user.contains("under 280 characters"));
        assert!(prompt.user.contains("- price"));
        assert!(prompt.user.contains("- date"));
    }

    #[test]
    fn test_key_point_order_changes_the_prompt() {
        let mut reordered = request();
        reordered.key_points.reverse();
        assert_ne!(
            build_prompt(&request()).unwrap().user,
            build_prompt(&reordered).unwrap().user
        );
    }

    #[test]
    fn test_stylistic_flags_flip_guidelines() {
        let mut plain = request();
        plain.style = StylisticFlags {
            emojis: false,
            hashtags: false,
            short_sentences: true,
        };
        let prompt = build_prompt(&plain).unwrap();
        assert!(prompt.user.contains("Do not use emojis"));
        assert!(prompt.user.contains("Do not include hashtags"));
        assert!(prompt.user.contains("short, punchy sentences"));
    }

    #[test]
    fn test_hints_carry_platform_budget() {
        let prompt = build_prompt(&request()).unwrap();
        assert_eq!(prompt.hints.max_length, Some(280));
        assert_eq!(prompt.hints.platform, Some(Platform::Twitter));
    }
}
