// src/cache.rs
// Small in-memory cache with lazy, read-time expiry

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default time-to-live for cached entries (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
}

/// String-keyed cache whose entries expire `ttl` after insertion.
///
/// There is no background eviction. A stale entry is dropped the next time
/// it is looked up.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached value if still fresh
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if entry.cached_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }

        // Stale: evict on the way out
        if let Ok(mut entries) = self.entries.write()
            && entries
                .get(key)
                .is_some_and(|e| e.cached_at.elapsed() >= self.ttl)
        {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.into(),
                CacheEntry {
                    value,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("targets_all", vec![1, 2, 3]);
        assert_eq!(cache.get("targets_all"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_key() {
        let cache: TtlCache<u32> = TtlCache::default();
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_stale_entry_is_evicted_on_read() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("k", "v".to_string());
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }
}
