//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Redis cache storing JSON-encoded values.
///
/// The connection is opened on first use and shared afterwards through a
/// `ConnectionManager`, which reconnects on its own. All operations are
/// fail-open: errors are logged and reads degrade to a miss.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    key_prefix: String,
}

impl RedisCache {
    /// Creates the client without connecting.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `key_prefix` - namespace prepended to every key (`CACHE_KEY_PREFIX`)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid.
    pub fn new(redis_url: &str, key_prefix: impl Into<String>) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: key_prefix.into(),
        })
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        self.connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| {
                        CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
                    })?;
                info!("✓ Connected to Redis");
                Ok(manager)
            })
            .await
            .cloned()
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        let key = self.build_key(key);
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Redis unavailable for GET {}: {}", key, e);
                return Ok(None);
            }
        };

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache HIT: {}", key);
                    Ok(Some(value))
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.build_key(key);
        let raw = serde_json::to_string(&value)?;
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable for SET {}: {}", key, e);
                return Ok(());
            }
        };

        let result = match ttl {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                conn.pset_ex::<_, _, ()>(&key, raw, millis).await
            }
            None => conn.set::<_, _, ()>(&key, raw).await,
        };

        match result {
            Ok(_) => {
                debug!("Cache SET: {} (TTL: {:?})", key, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable for DEL {}: {}", key, e);
                return Ok(());
            }
        };

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache DEL: {}", key);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        match self.connection().await {
            Ok(mut conn) => conn.ping::<()>().await.is_ok(),
            Err(_) => false,
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(matches!(
            RedisCache::new("not a url", "cache:"),
            Err(CacheError::ConnectionError(_))
        ));
    }

    #[test]
    fn test_keys_are_prefixed() {
        let cache = RedisCache::new("redis://127.0.0.1:6379/0", "cache:").unwrap();
        assert_eq!(cache.build_key("examples:1"), "cache:examples:1");
    }
}
