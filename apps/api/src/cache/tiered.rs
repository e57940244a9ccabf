//! Two-tier cache composition: in-process LRU in front, durable store behind.
//!
//! Reads check the memory tier first, then the durable tier; a durable hit
//! is promoted into memory so the next read is local. Writes land in both.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::durable::{durable_key, DurableCache};
use crate::cache::KeyValueCache;

pub struct TieredCache<V> {
    memory: KeyValueCache<V>,
    durable: Arc<dyn DurableCache>,
    namespace: String,
    ttl: Duration,
}

impl<V> TieredCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    pub fn new(
        capacity: usize,
        ttl: Duration,
        namespace: impl Into<String>,
        durable: Arc<dyn DurableCache>,
    ) -> Self {
        Self {
            memory: KeyValueCache::new(capacity, ttl),
            durable,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Memory tier, then durable tier. A durable hit is promoted.
    pub async fn get(&self, fingerprint: &str) -> Option<V> {
        if let Some(hit) = self.memory.get(fingerprint) {
            debug!("Cache hit (memory) for {}", self.namespace);
            return Some(hit);
        }
        let key = durable_key(&self.namespace, fingerprint);
        let raw = self.durable.get(&key).await?;
        match serde_json::from_value::<V>(raw) {
            Ok(value) => {
                debug!("Cache hit (durable) for {}, promoting", self.namespace);
                self.memory.set(fingerprint, value.clone());
                Some(value)
            }
            Err(e) => {
                warn!("Durable entry for {} failed to decode: {e}", self.namespace);
                self.durable.remove(&key).await;
                None
            }
        }
    }

    /// Writes to both tiers. A durable-tier failure is absorbed by the
    /// store implementation; the memory write always succeeds.
    pub async fn set(&self, fingerprint: &str, value: &V) {
        self.memory.set(fingerprint, value.clone());
        match serde_json::to_value(value) {
            Ok(raw) => {
                let key = durable_key(&self.namespace, fingerprint);
                self.durable.set(&key, raw, self.ttl).await;
            }
            Err(e) => {
                warn!(
                    "Value for {} is not serializable, kept in memory only: {e}",
                    self.namespace
                );
            }
        }
    }

    pub fn clear_memory(&self) {
        self.memory.clear();
    }
}
