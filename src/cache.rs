//! Annotation cache
//!
//! The annotator consults an [`AnnotationCache`] before any upstream call.
//! [`TtlCache`] is the default implementation: entries expire after a TTL
//! and the least recently used entry is evicted when the cache is full.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hnf1b_variants::cache::{AnnotationCache, TtlCache};
//!
//! let cache = TtlCache::new(Duration::from_secs(86_400), 10_000);
//! assert!(cache.stats().size == 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotationRecord;
use crate::variant::CanonicalKey;

/// Default time-to-live (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of entries
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Statistics for cache usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses (including expired entries)
    pub misses: u64,
    /// Number of items currently in cache
    pub size: usize,
    /// Maximum cache capacity
    pub capacity: usize,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because they outlived the TTL
    pub expirations: u64,
    pub ttl_seconds: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Store of annotation records keyed by canonical key
pub trait AnnotationCache: Send + Sync {
    /// Fresh record for `key`, if any
    fn get(&self, key: &CanonicalKey) -> Option<AnnotationRecord>;

    /// Insert or replace the record for `key`
    fn put(&self, key: CanonicalKey, record: AnnotationRecord);

    /// Drop one entry; returns whether it was present
    fn invalidate(&self, key: &CanonicalKey) -> bool;

    /// Drop every entry
    fn invalidate_all(&self);

    fn stats(&self) -> CacheStats;
}

struct Entry {
    record: AnnotationRecord,
    inserted_at: Instant,
    last_access: AtomicU64,
}

/// Thread-safe cache with TTL expiry and LRU eviction
pub struct TtlCache {
    entries: RwLock<HashMap<CanonicalKey, Entry>>,
    ttl: Duration,
    capacity: usize,
    /// Access counter for LRU tracking
    access_counter: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl TtlCache {
    /// Create a cache; a zero TTL makes every entry stale immediately
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            ttl,
            capacity,
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry.inserted_at.elapsed() < self.ttl
    }

    /// Remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.purge_locked(&mut entries)
    }

    fn purge_locked(&self, entries: &mut HashMap<CanonicalKey, Entry>) -> usize {
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        let purged = before - entries.len();
        self.expirations
            .fetch_add(purged as u64, Ordering::Relaxed);
        purged
    }

    /// Evict the least recently used entry
    fn evict_lru(&self, entries: &mut HashMap<CanonicalKey, Entry>) {
        if let Some(lru_key) = entries
            .iter()
            .min_by_key(|(_, e)| e.last_access.load(Ordering::Relaxed))
            .map(|(k, _)| k.clone())
        {
            entries.remove(&lru_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl AnnotationCache for TtlCache {
    fn get(&self, key: &CanonicalKey) -> Option<AnnotationRecord> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if self.is_fresh(entry) => {
                    entry.last_access.store(self.tick(), Ordering::Relaxed);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.record.clone());
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired: drop it under the write lock unless it was refreshed meanwhile
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|e| !self.is_fresh(e)) {
            entries.remove(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("cache entry {} expired", key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, key: CanonicalKey, record: AnnotationRecord) {
        if self.capacity == 0 {
            return;
        }
        let access = self.tick();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            self.purge_locked(&mut entries);
            if entries.len() >= self.capacity {
                self.evict_lru(&mut entries);
            }
        }

        entries.insert(
            key,
            Entry {
                record,
                inserted_at: Instant::now(),
                last_access: AtomicU64::new(access),
            },
        );
    }

    fn invalidate(&self, key: &CanonicalKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        tracing::info!("annotation cache cleared ({} entries)", dropped);
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: entries.len(),
            capacity: self.capacity,
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{AnnotationRecord, ConsequenceResult};
    use crate::reference::GenomeBuild;
    use crate::variant::GenomicChange;

    fn key(pos: u64) -> CanonicalKey {
        GenomicChange::new(GenomeBuild::GRCh38, "17", pos, "A", "G")
            .unwrap()
            .canonical_key()
    }

    fn record(pos: u64) -> AnnotationRecord {
        AnnotationRecord::from_result(
            key(pos),
            "test",
            GenomeBuild::GRCh38,
            "test",
            ConsequenceResult {
                most_severe_consequence: "intron_variant".to_string(),
                transcript_consequences: Vec::new(),
                colocated_variants: Vec::new(),
                predictor_version: "1".to_string(),
            },
        )
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = TtlCache::default();
        assert!(cache.get(&key(1)).is_none());
        cache.put(key(1), record(1));
        assert_eq!(cache.get(&key(1)).unwrap().key, key(1));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
        assert_eq!(stats.ttl_seconds, 86_400);
        assert!((stats.hit_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TtlCache::new(DEFAULT_TTL, 2);
        cache.put(key(1), record(1));
        cache.put(key(2), record(2));
        // touch 1 so that 2 is least recently used
        assert!(cache.get(&key(1)).is_some());
        cache.put(key(3), record(3));

        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());
        assert!(cache.get(&key(3)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_zero_ttl_is_always_stale() {
        let cache = TtlCache::new(Duration::ZERO, 10);
        cache.put(key(1), record(1));
        assert!(cache.get(&key(1)).is_none());
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = TtlCache::new(Duration::from_millis(30), 10);
        cache.put(key(1), record(1));
        assert!(cache.get(&key(1)).is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn test_expired_entries_make_room_before_eviction() {
        let cache = TtlCache::new(Duration::from_millis(20), 1);
        cache.put(key(1), record(1));
        std::thread::sleep(Duration::from_millis(40));
        cache.put(key(2), record(2));
        let stats = cache.stats();
        assert_eq!((stats.evictions, stats.expirations), (0, 1));
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::default();
        cache.put(key(1), record(1));
        cache.put(key(2), record(2));
        assert!(cache.invalidate(&key(1)));
        assert!(!cache.invalidate(&key(1)));
        assert_eq!(cache.len(), 1);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
