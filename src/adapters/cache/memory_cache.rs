use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::ports::cache::CatalogCache;

const FALLBACK_CAPACITY: NonZeroUsize = NonZeroUsize::new(16).unwrap();

struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// LRU store with a per-entry TTL. Expired entries are dropped lazily on read.
pub struct MemoryCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or_else(|| {
            tracing::warn!(
                "Catalogue cache max_entries was 0, defaulting to {FALLBACK_CAPACITY}"
            );
            FALLBACK_CAPACITY
        });
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let Ok(mut cache) = self.inner.lock() else {
            tracing::error!(key, "Catalogue cache lock poisoned, treating as miss");
            return None;
        };
        if cache.peek(key)?.is_expired(Instant::now()) {
            cache.pop(key);
            return None;
        }
        cache.get(key).map(|entry| entry.payload.clone())
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let Ok(mut cache) = self.inner.lock() else {
            tracing::error!(key, "Catalogue cache lock poisoned, skipping write");
            return;
        };
        cache.put(
            key.to_string(),
            CacheEntry {
                payload: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.pop(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_on_empty_cache() {
        let cache = MemoryCache::new(4);
        assert!(cache.get("catalog:data/homestays.json").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn stores_and_returns_payload() {
        let cache = MemoryCache::new(4);
        cache.set("catalog:a", "[]", Duration::from_secs(60));
        assert_eq!(cache.get("catalog:a").as_deref(), Some("[]"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = MemoryCache::new(4);
        cache.set("catalog:a", "[]", Duration::ZERO);
        assert!(cache.get("catalog:a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = MemoryCache::new(2);
        cache.set("a", "1", Duration::from_secs(60));
        cache.set("b", "2", Duration::from_secs(60));
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.set("c", "3", Duration::from_secs(60));
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn invalidate_drops_entry() {
        let cache = MemoryCache::new(4);
        cache.set("a", "1", Duration::from_secs(60));
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn zero_capacity_uses_fallback() {
        let cache = MemoryCache::new(0);
        cache.set("a", "1", Duration::from_secs(60));
        assert_eq!(cache.get("a").as_deref(), Some("1"));
    }
}
