//! Bounded, time-expiring caches backing the analysis pipeline.
//!
//! `KeyValueCache` is the in-process tier: LRU order, fixed capacity, TTL
//! checked on every read. `durable` adds the Redis-backed tier that survives
//! restarts; `tiered` composes the two; `memo` builds argument-keyed
//! memoization on top.

#![allow(dead_code)]

pub mod durable;
pub mod memo;
pub mod tiered;

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

/// A cached value plus its insertion time. Replacement is delete+insert;
/// an entry is never mutated after it goes in.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Generic bounded, time-expiring cache.
///
/// Reads never fail: an expired or evicted key is simply absent. A `set`
/// on a full cache evicts exactly the least-recently-used entry first.
/// All mutation happens under one synchronous lock acquisition; nothing
/// is held across an await point.
pub struct KeyValueCache<V> {
    inner: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> KeyValueCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the cached value, refreshing its recency. Expired entries
    /// are removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.inner.lock().unwrap();
        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() <= self.ttl {
                return Some(entry.value.clone());
            }
            cache.pop(key);
        }
        None
    }

    /// Inserts a value, evicting the least-recently-used entry when full.
    /// Re-setting an existing key replaces the entry and refreshes recency.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let mut cache = self.inner.lock().unwrap();
        cache.put(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().unwrap().pop(key);
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
