//! Argument-keyed memoization for async functions.
//!
//! Keys are the stable serialization of the full argument list, so two
//! calls are "identical" when their arguments serialize identically:
//! value-based, order-sensitive, never reference-based. Results that do
//! not serialize are computed and returned but not cached; a failed call
//! is never cached and the next identical call retries.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cache::KeyValueCache;

pub struct Memoizer {
    cache: KeyValueCache<Value>,
}

impl Memoizer {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: KeyValueCache::new(capacity, ttl),
        }
    }

    /// Runs `f` unless an identical call already resolved within the TTL
    /// window. `op` namespaces the key so distinct operations with equal
    /// arguments do not collide.
    pub async fn get_or_compute<A, R, E, F, Fut>(&self, op: &str, args: &A, f: F) -> Result<R, E>
    where
        A: Serialize + ?Sized,
        R: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let key = match serde_json::to_string(args) {
            Ok(serialized) => format!("{op}:{serialized}"),
            Err(e) => {
                warn!("Memoization skipped for {op}: arguments not serializable: {e}");
                return f().await;
            }
        };

        if let Some(raw) = self.cache.get(&key) {
            match serde_json::from_value::<R>(raw) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    // Stale shape from an older build; recompute.
                    warn!("Memoized value for {op} failed to decode, recomputing: {e}");
                    self.cache.remove(&key);
                }
            }
        }

        let value = f().await?;
        match serde_json::to_value(&value) {
            Ok(raw) => self.cache.set(key, raw),
            Err(e) => warn!("Result of {op} not serializable, returned uncached: {e}"),
        }
        Ok(value)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
