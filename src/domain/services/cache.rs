//! Bounded TTL cache for validation results
//!
//! Passed explicitly into the orchestrator; there is no process-wide instance.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Hit/miss counters at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct Entry<V> {
    inserted_at: Instant,
    value: V,
}

/// Cache with a fixed capacity and per-entry time-to-live
///
/// When full, the oldest entry is evicted. Expired entries are dropped on
/// lookup.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let fresh = match entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.inserted_at) < self.ttl,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if fresh {
            self.hits.fetch_add(1, Ordering::Relaxed);
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert as of `now`
    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        let mut entries = self.lock();
        entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < self.ttl);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                inserted_at: now,
                value,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Entry<V>>> {
        // Entries are plain values; a poisoned map is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_then_expire() {
        let cache = TtlCache::new(4, Duration::from_secs(300));
        let start = Instant::now();
        cache.insert_at("ctx", 1, start);

        assert_eq!(cache.get_at(&"ctx", start + Duration::from_secs(10)), Some(1));
        assert_eq!(cache.get_at(&"ctx", start + Duration::from_secs(301)), None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = TtlCache::new(2, Duration::from_secs(300));
        let start = Instant::now();
        cache.insert_at("a", 1, start);
        cache.insert_at("b", 2, start + Duration::from_millis(1));
        cache.insert_at("c", 3, start + Duration::from_millis(2));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&"a", start + Duration::from_millis(3)), None);
        assert_eq!(cache.get_at(&"c", start + Duration::from_millis(3)), Some(3));
    }

    #[test]
    fn reinserting_existing_key_does_not_evict() {
        let cache = TtlCache::new(2, Duration::from_secs(300));
        let start = Instant::now();
        cache.insert_at("a", 1, start);
        cache.insert_at("b", 2, start);
        cache.insert_at("a", 10, start + Duration::from_millis(1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&"b", start), Some(2));
    }

    #[test]
    fn clear_empties_cache() {
        let cache = TtlCache::new(4, Duration::from_secs(300));
        cache.insert("a", 1);
        cache.clear();
        assert!(cache.get(&"a").is_none());
    }
}
