//! Durable key/value cache tier.
//!
//! Entries survive process restarts until TTL expiry. Keys take the form
//! `<namespace>_<base64(fingerprint)>`; values are JSON `{ data, timestamp }`.
//! The timestamp is checked on read as well, so a store that ignores TTLs
//! still never serves stale data.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Builds the durable key for a fingerprint within a namespace.
pub fn durable_key(namespace: &str, fingerprint: &str) -> String {
    format!("{}_{}", namespace, BASE64.encode(fingerprint.as_bytes()))
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    data: Value,
    /// Unix millis at write time.
    timestamp: i64,
}

/// Durable tier contract. Failures are absorbed by implementations: a
/// broken store degrades to cache misses, it never fails an analysis.
#[async_trait]
pub trait DurableCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn remove(&self, key: &str);
}

/// Redis-backed durable cache.
pub struct RedisCache {
    conn: redis::aio::MultiplexedConnection,
    ttl: Duration,
}

impl RedisCache {
    pub fn new(conn: redis::aio::MultiplexedConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    fn is_fresh(&self, entry: &StoredEntry) -> bool {
        let age_ms = Utc::now().timestamp_millis() - entry.timestamp;
        age_ms >= 0 && age_ms as u128 <= self.ttl.as_millis()
    }
}

#[async_trait]
impl DurableCache for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Durable cache read failed for {key}: {e}");
                return None;
            }
        };
        let raw = raw?;
        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(e) => {
                warn!("Durable cache entry for {key} is corrupt, dropping: {e}");
                self.remove(key).await;
                return None;
            }
        };
        if !self.is_fresh(&entry) {
            debug!("Durable cache entry for {key} expired");
            self.remove(key).await;
            return None;
        }
        Some(entry.data)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = StoredEntry {
            data: value,
            timestamp: Utc::now().timestamp_millis(),
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(p) => p,
            Err(e) => {
                warn!("Durable cache entry for {key} is not serializable: {e}");
                return;
            }
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1))
            .await
        {
            warn!("Durable cache write failed for {key}: {e}");
        }
    }

    async fn remove(&self, key: &str) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(key).await {
            warn!("Durable cache delete failed for {key}: {e}");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryDurableCache;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_durable_key_shape() {
        let key = durable_key("resume_analysis", "abc");
        assert!(key.starts_with("resume_analysis_"));
        let encoded = key.trim_start_matches("resume_analysis_");
        assert_eq!(BASE64.decode(encoded).unwrap(), b"abc");
    }

    #[test]
    fn test_durable_key_is_deterministic() {
        assert_eq!(durable_key("ns", "fp"), durable_key("ns", "fp"));
        assert_ne!(durable_key("ns", "fp"), durable_key("ns", "fp2"));
    }

    #[tokio::test]
    async fn test_memory_tier_roundtrip() {
        let cache = MemoryDurableCache::new();
        cache
            .set("k", json!({"score": 75}), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await, Some(json!({"score": 75})));
    }

    #[tokio::test]
    async fn test_memory_tier_expiry() {
        let cache = MemoryDurableCache::new();
        cache
            .set("k", json!(1), Duration::from_millis(5))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
    }
}
