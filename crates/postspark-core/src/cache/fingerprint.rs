use std::fmt;

use crate::request::GenerationRequest;

/// Stable cache key over the caller scope and the full request.
///
/// Every distinguishing field is folded into a blake3 hash through a
/// length-prefixed canonical encoding, so the key is independent of how the
/// request value was assembled in memory but sensitive to the order of
/// `key_points` (point order changes the prompt, therefore the semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint for a request scoped to one user.
    pub fn compute(scope: &str, request: &GenerationRequest) -> Self {
        let mut hasher = blake3::Hasher::new();

        write_str(&mut hasher, scope);
        write_str(&mut hasher, &request.topic);
        write_str(&mut hasher, &request.platform.to_string());
        write_str(&mut hasher, &request.content_type.to_string());
        write_str(&mut hasher, &request.tone.to_string());
        write_str(&mut hasher, &request.goal.to_string());
        write_str(&mut hasher, &request.language);

        hasher.update(&(request.key_points.len() as u64).to_le_bytes());
        for point in &request.key_points {
            write_str(&mut hasher, point);
        }

        hasher.update(&[
            request.style.emojis as u8,
            request.style.hashtags as u8,
            request.style.short_sentences as u8,
            request.use_cache as u8,
        ]);

        Self(*hasher.finalize().as_bytes())
    }
}

// Length prefix keeps adjacent fields from bleeding into each other
// ("ab" + "c" must not collide with "a" + "bc").
fn write_str(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
