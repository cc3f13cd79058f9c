//! Caching layer.
//!
//! Provides a [`CacheStore`] trait with two implementations:
//! - [`RedisCache`] - Redis-backed store, selected when `REDIS_ENABLED=true`
//! - [`MemoryCache`] - in-process map for development and tests
//!
//! Callers use the typed [`Cache`] handle, which (de)serializes values through
//! JSON and records hit/miss counters.

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheStore};

#[cfg(test)]
pub use service::MockCacheStore;

use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RedisConfig;

/// Typed, cloneable handle over a shared [`CacheStore`].
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// In-process cache, handy for tests and tools.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Reads and decodes a value.
    ///
    /// A stored value that no longer decodes as `T` is treated as a miss.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let backend = self.store.backend();
        match self.store.get(key).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(decoded) => {
                    metrics::counter!("cache_hits_total", "backend" => backend).increment(1);
                    Ok(Some(decoded))
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Cached value has unexpected shape");
                    metrics::counter!("cache_misses_total", "backend" => backend).increment(1);
                    Ok(None)
                }
            },
            None => {
                metrics::counter!("cache_misses_total", "backend" => backend).increment(1);
                Ok(None)
            }
        }
    }

    /// Encodes and stores a value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Serialization`] if `value` cannot be encoded.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, value, ttl).await
    }

    pub async fn del(&self, key: &str) -> CacheResult<()> {
        self.store.del(key).await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }
}

/// Picks the cache implementation once at startup.
///
/// Falls back to [`MemoryCache`] when Redis is enabled but the URL cannot be
/// parsed; connection problems are handled later by the fail-open store.
pub fn build_cache(config: &RedisConfig) -> Cache {
    if !config.enabled {
        tracing::info!("Cache: in-memory");
        return Cache::in_memory();
    }

    match RedisCache::new(&config.url(), config.key_prefix.clone()) {
        Ok(redis) => {
            tracing::info!("Cache: Redis at {}:{}", config.host, config.port);
            Cache::new(Arc::new(redis))
        }
        Err(e) => {
            tracing::warn!("Invalid Redis settings: {}. Using in-memory cache.", e);
            Cache::in_memory()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        name: String,
    }

    fn redis_config(enabled: bool) -> RedisConfig {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            enabled,
            key_prefix: "cache:".to_string(),
        }
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let cache = Cache::in_memory();
        let item = Item {
            id: 7,
            name: "seven".to_string(),
        };

        cache.set("item:7", &item, None).await.unwrap();
        assert_eq!(cache.get::<Item>("item:7").await.unwrap(), Some(item));

        cache.del("item:7").await.unwrap();
        assert_eq!(cache.get::<Item>("item:7").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_a_miss() {
        let mut store = MockCacheStore::new();
        store.expect_backend().return_const("mock");
        store
            .expect_get()
            .returning(|_| Ok(Some(json!({"unexpected": true}))));

        let cache = Cache::new(Arc::new(store));
        assert_eq!(cache.get::<Item>("item:1").await.unwrap(), None);
    }

    #[test]
    fn test_factory_selects_backend() {
        assert_eq!(build_cache(&redis_config(false)).backend(), "memory");
        assert_eq!(build_cache(&redis_config(true)).backend(), "redis");
    }
}
