//! EmberCache: shareable LRU front with statistics

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Cloneable handle to a lock-guarded [`LruCache`] with hit/miss accounting
///
/// Every clone points at the same cache. Mutating operations hold the write
/// lock across the whole index-and-list update, so no reader ever observes
/// the two structures disagreeing; `get` counts as mutating because it
/// promotes the looked-up key.
pub struct EmberCache<K, V> {
    /// Core structure, guarded as a single critical section
    cache: Arc<RwLock<LruCache<K, V>>>,

    /// Shared hit/miss/eviction/insert counters
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,
}

impl<K, V> Clone for EmberCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
        }
    }
}

impl<K, V> EmberCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of cached entries
    ///
    /// # Returns
    /// * `Result<EmberCache>` - Shareable cache handle
    pub fn new(capacity: usize) -> Result<Self> {
        let cache = LruCache::new(capacity)?;

        Ok(Self {
            cache: Arc::new(RwLock::new(cache)),
            stats: Arc::new(CacheStats::new()),
            capacity,
        })
    }

    /// Get a value, promoting its key and recording a hit or miss
    ///
    /// Takes the write lock even though this is a read: the lookup also
    /// moves the key to the most-recently-used position.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.cache.write();
        match cache.get(key) {
            Some(value) => {
                let value = value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Insert or update a key-value pair, recording the insert
    ///
    /// When a new key lands in a full cache, the displaced entry is counted
    /// as an eviction; overwriting a present key displaces nothing.
    pub fn put(&self, key: K, value: V) {
        let mut cache = self.cache.write();
        if cache.len() == self.capacity && !cache.contains_key(&key) {
            self.stats.record_eviction();
        }
        cache.put(key, value);
        self.stats.record_insert();
    }

    /// Remove a key, returning its value
    pub fn remove(&self, key: &K) -> Option<V> {
        self.cache.write().remove(key)
    }

    /// Look up a value without promoting its key or touching the stats
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.cache.read().peek(key).cloned()
    }

    /// Whether `key` is currently cached, without promoting it
    pub fn contains_key(&self, key: &K) -> bool {
        self.cache.read().contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&self) {
        self.cache.write().clear();
        self.stats.reset();
    }

    /// Shared statistics counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Recover the core cache from the last remaining handle
    ///
    /// Fails with [`Error::Shared`] while other clones are alive; the handle
    /// is consumed either way.
    pub fn into_inner(self) -> Result<LruCache<K, V>> {
        match Arc::try_unwrap(self.cache) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(_) => Err(Error::Shared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss_accounting() {
        let cache = EmberCache::new(10).unwrap();

        cache.put(1u64, "a");
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&2), None);

        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().inserts(), 1);
        assert_eq!(cache.stats().hit_ratio(), 0.5);
    }

    #[test]
    fn test_eviction_recorded() {
        let cache = EmberCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // displaces 1

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions(), 1);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_update_at_capacity_is_not_an_eviction() {
        let cache = EmberCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(1, "a2");

        assert_eq!(cache.stats().evictions(), 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some("a2"));
    }

    #[test]
    fn test_peek_and_contains_skip_stats_and_order() {
        let cache = EmberCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.peek(&1), Some("a"));
        assert!(cache.contains_key(&1));
        assert_eq!(cache.stats().hits(), 0);
        assert_eq!(cache.stats().misses(), 0);

        // Key 1 was not promoted, so it is still the one displaced.
        cache.put(3, "c");
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&2));
    }

    #[test]
    fn test_remove() {
        let cache = EmberCache::new(4).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_cache_and_stats() {
        let cache = EmberCache::new(4).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits(), 0);
        assert_eq!(cache.stats().inserts(), 0);
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn test_handles_share_state() {
        let cache = EmberCache::new(4).unwrap();
        let other = cache.clone();

        cache.put(1, "a");
        assert_eq!(other.get(&1), Some("a"));
        assert_eq!(other.len(), 1);

        // Stats are shared too.
        assert_eq!(cache.stats().hits(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            EmberCache::<u32, u32>::new(0),
            Err(Error::ZeroCapacity)
        ));
    }

    #[test]
    fn test_into_inner_requires_last_handle() {
        let cache = EmberCache::new(4).unwrap();
        cache.put(1, 10);

        let dup = cache.clone();
        assert!(matches!(cache.into_inner(), Err(Error::Shared)));

        // The failed call consumed the first handle, so this one is last.
        let mut inner = dup.into_inner().unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner.get(&1), Some(&10));
    }

    #[test]
    fn test_threaded_handles_stay_consistent() {
        let cache = EmberCache::new(64).unwrap();
        let threads = 4;
        let per_thread = 100u64;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let base = t as u64 * per_thread;
                    for i in 0..per_thread {
                        cache.put(base + i, i);
                        cache.get(&(base + i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total_ops = threads as u64 * per_thread;
        assert_eq!(cache.stats().inserts(), total_ops);
        assert_eq!(cache.stats().hits() + cache.stats().misses(), total_ops);
        assert!(cache.len() <= cache.capacity());
    }
}
