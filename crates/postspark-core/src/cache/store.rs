use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

use super::fingerprint::Fingerprint;
use crate::result::GenerationResult;

/// One cached generation plus its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: GenerationResult,
    pub stored_at: Instant,
}

/// Bounded LRU cache of completed generations with TTL expiry.
///
/// Entries are stored with `cached = false`; the orchestrator flips the
/// flag when serving a hit. Expiry is checked on lookup so a stale entry is
/// never returned.
pub struct ResultCache {
    entries: Mutex<LruCache<Fingerprint, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    /// Creates a cache bounded to `capacity` entries with the given TTL.
    ///
    /// A zero capacity is clamped to one entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the stored result for `key`, if present and fresh.
    pub async fn lookup(&self, key: &Fingerprint) -> Option<GenerationResult> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.result.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            tracing::debug!("[ResultCache] expired entry evicted: {key}");
        }
        None
    }

    /// Stores a result under `key`, evicting the least recently used entry
    /// when full.
    pub async fn store(&self, key: Fingerprint, result: GenerationResult) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key,
            CacheEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (expired ones included until next lookup).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ContentType, GenerationRequest, Goal, Platform, StylisticFlags, Tone};
    use crate::result::{ResultMetadata, TokenUsage};

    fn request(topic: &str) -> GenerationRequest {
        GenerationRequest {
            topic: topic.to_string(),
            platform: Platform::Instagram,
            content_type: ContentType::Post,
            tone: Tone::Casual,
            goal: Goal::Engagement,
            key_points: vec![],
            language: "en".to_string(),
            style: StylisticFlags::default(),
            use_cache: true,
        }
    }

    fn result(content: &str) -> GenerationResult {
        GenerationResult {
            content: content.to_string(),
            hashtags: vec![],
            cached: false,
            usage: TokenUsage::new(10, 20),
            metadata: ResultMetadata {
                platform: Platform::Instagram,
                content_type: ContentType::Post,
                generated_at_ms: 0,
                prompt_version: "v1".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let cache = ResultCache::new(8, Duration::from_secs(60));
        let key = Fingerprint::compute("user", &request("launch"));

        assert!(cache.lookup(&key).await.is_none());
        cache.store(key, result("hello")).await;

        let hit = cache.lookup(&key).await.unwrap();
        assert_eq!(hit.content, "hello");
        assert!(!hit.cached);
    }

    #[tokio::test]
    async fn test_expired_entries_are_never_returned() {
        let cache = ResultCache::new(8, Duration::ZERO);
        let key = Fingerprint::compute("user", &request("launch"));

        cache.store(key, result("hello")).await;
        assert!(cache.lookup(&key).await.is_none());
        // The expired entry is also removed
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = ResultCache::new(2, Duration::from_secs(60));
        let first = Fingerprint::compute("user", &request("one"));
        let second = Fingerprint::compute("user", &request("two"));
        let third = Fingerprint::compute("user", &request("three"));

        cache.store(first, result("1")).await;
        cache.store(second, result("2")).await;
        // Touch `first` so `second` becomes the eviction candidate
        assert!(cache.lookup(&first).await.is_some());
        cache.store(third, result("3")).await;

        assert!(cache.lookup(&first).await.is_some());
        assert!(cache.lookup(&second).await.is_none());
        assert!(cache.lookup(&third).await.is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let cache = ResultCache::new(0, Duration::from_secs(60));
        let key = Fingerprint::compute("user", &request("launch"));
        cache.store(key, result("hello")).await;
        assert_eq!(cache.len().await, 1);
    }
}
