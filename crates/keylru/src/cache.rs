//! Cache: thread-safe LRU engine

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::Result;
use crate::keyed::Keyed;
use crate::lru::{Admission, LruCache};
use crate::stats::CacheStats;

/// Fixed-capacity LRU cache that can be shared between threads
///
/// Every operation holds one cache-wide lock for its whole duration, so the
/// index and the recency list are always observed together. Items handed
/// back to callers are clones; share the cache itself with `Arc<Cache<T>>`.
pub struct Cache<T> {
    /// Index and recency list, guarded together
    inner: Mutex<LruCache<T>>,

    /// Cache statistics
    stats: CacheStats,

    /// Label for log events
    name: String,
}

impl<T: Keyed + Clone> Cache<T> {
    /// Create a new cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of items in cache
    ///
    /// # Returns
    /// * `Result<Cache<T>>` - `Error::InvalidCapacity` if `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(&CacheConfig::new(capacity))
    }

    /// Create a new cache from a validated config
    pub fn with_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let inner = LruCache::new(config.capacity)?;
        debug!(cache = %config.name, capacity = config.capacity, "created LRU cache");

        Ok(Self {
            inner: Mutex::new(inner),
            stats: CacheStats::new(),
            name: config.name.clone(),
        })
    }

    /// Insert or overwrite an item and mark it most recently used
    ///
    /// A new key evicts the least recently used item when the cache is full.
    /// Overwriting an existing key never evicts.
    pub fn add(&self, item: T) {
        let mut cache = self.inner.lock();
        match cache.add(item) {
            Admission::Inserted => {
                self.stats.record_insert();
                trace!(cache = %self.name, size = cache.len(), "inserted entry");
            }
            Admission::Replaced(previous) => {
                self.stats.record_update();
                trace!(cache = %self.name, key = previous.key(), "replaced entry");
            }
            Admission::Evicted(evicted) => {
                self.stats.record_insert();
                self.stats.record_eviction();
                debug!(cache = %self.name, key = evicted.key(), "evicted least recently used entry");
            }
        }
    }

    /// Get a copy of an item and mark it most recently used
    ///
    /// A miss leaves the cache untouched.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.inner.lock();
        match cache.get(key) {
            Some(item) => {
                self.stats.record_hit();
                Some(item.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Get a copy of an item without changing its recency or the stats
    pub fn peek(&self, key: &str) -> Option<T> {
        self.inner.lock().peek(key).cloned()
    }

    /// Remove an item, returning it if it was present
    pub fn remove(&self, key: &str) -> Option<T> {
        let removed = self.inner.lock().remove(key);
        if removed.is_some() {
            self.stats.record_removal();
            trace!(cache = %self.name, key, "removed entry");
        }
        removed
    }

    /// Copy of the most recently used item
    pub fn peek_head(&self) -> Option<T> {
        self.inner.lock().peek_head().cloned()
    }

    /// Copy of the least recently used item
    pub fn peek_tail(&self) -> Option<T> {
        self.inner.lock().peek_tail().cloned()
    }

    /// Check whether a key is present without changing its recency
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    /// Visit every item from most to least recently used
    ///
    /// The visitor gets each item with its zero-based position. The cache
    /// stays locked until the walk finishes, so the visitor must not call
    /// back into the same cache.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&T, usize),
    {
        let cache = self.inner.lock();
        for (index, item) in cache.iter().enumerate() {
            visit(item, index);
        }
    }

    /// Copies of every item, most recently used first
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Get current number of items
    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Remove every item and reset statistics
    pub fn clear(&self) {
        let mut cache = self.inner.lock();
        cache.clear();
        self.stats.reset();
        debug!(cache = %self.name, "cleared cache");
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Name used in log events
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Verify index and recency list agree (see [`LruCache::check_invariants`])
    pub fn check_invariants(&self) -> Result<()> {
        self.inner.lock().check_invariants()
    }
}
