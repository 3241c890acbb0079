//! Best-effort hashtag enrichment.
//!
//! Chained after primary generation; never fails and never blocks the
//! primary result. A backend suggestion is preferred, with a local keyword
//! fallback when the call fails or yields nothing usable. Not quota-gated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use postspark_core::backend::{GenerationBackend, PromptHints, PromptRequest};

/// Upper bound used by the orchestrator.
pub const DEFAULT_MAX_HASHTAGS: usize = 10;

const HASHTAG_SYSTEM: &str = "You suggest short, relevant social media hashtags. \
Respond with hashtags only, separated by spaces, no commentary.";

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    // Words of four letters or more; shorter tokens make useless tags
    Regex::new(r"[A-Za-z][A-Za-z0-9]{3,}").unwrap()
});

const STOPWORDS: &[&str] = &[
    "this", "that", "with", "from", "your", "about", "have", "will", "they", "their", "what",
    "when", "where", "which", "would", "could", "there", "been", "because", "into", "more",
    "some", "than", "then", "them", "these", "those", "just", "like", "over", "only", "also",
    "after", "before", "while", "make", "made", "every", "each", "very", "much", "many", "most",
    "such", "here", "want", "need", "dont", "youre",
];

/// Suggests hashtags for generated content.
pub struct HashtagEnricher {
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl HashtagEnricher {
    /// Enricher backed by a generation provider, with keyword fallback.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Enricher using only local keyword extraction.
    pub fn offline() -> Self {
        Self { backend: None }
    }

    /// Returns between 0 and `max_count` normalized hashtags.
    ///
    /// Internal failures are logged and swallowed; this method cannot fail.
    pub async fn suggest(&self, content: &str, max_count: usize) -> Vec<String> {
        if max_count == 0 || content.trim().is_empty() {
            return Vec::new();
        }

        if let Some(backend) = &self.backend {
            match self.suggest_via_backend(backend.as_ref(), content, max_count).await {
                Ok(tags) if !tags.is_empty() => return tags,
                Ok(_) => {
                    tracing::debug!("[HashtagEnricher] backend returned no usable tags");
                }
                Err(err) => {
                    tracing::warn!("[HashtagEnricher] backend suggestion failed: {err:#}");
                }
            }
        }

        keyword_fallback(content, max_count)
    }

    async fn suggest_via_backend(
        &self,
        backend: &dyn GenerationBackend,
        content: &str,
        max_count: usize,
    ) -> anyhow::Result<Vec<String>> {
        let prompt = PromptRequest {
            system: HASHTAG_SYSTEM.to_string(),
            user: format!(
                "Suggest up to {max_count} hashtags for this content:\n\n{content}"
            ),
            hints: PromptHints::default(),
        };

        let response = backend
            .generate(&prompt)
            .await
            .context("hashtag suggestion call failed")?;

        Ok(normalize(response.text.split_whitespace(), max_count))
    }
}

/// Frequency-ranked keyword extraction used when no backend tags arrive.
fn keyword_fallback(content: &str, max_count: usize) -> Vec<String> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for (index, word) in WORD_RE.find_iter(content).enumerate() {
        let word = word.as_str().to_lowercase();
        if STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        first_seen.entry(word.clone()).or_insert(index);
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // Frequency first, earliest appearance as the deterministic tiebreak
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| first_seen.get(&a.0).cmp(&first_seen.get(&b.0)))
    });

    normalize(ranked.iter().map(|(word, _)| word.as_str()), max_count)
}

/// Lowercases, strips punctuation, prefixes `#`, dedupes, caps the count.
fn normalize<'a>(candidates: impl Iterator<Item = &'a str>, max_count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    for candidate in candidates {
        let cleaned: String = candidate
            .trim_start_matches('#')
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if cleaned.len() < 2 {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            tags.push(format!("#{cleaned}"));
        }
        if tags.len() == max_count {
            break;
        }
    }

    tags
}
