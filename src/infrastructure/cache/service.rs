//! Cache store trait and error types.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store holding JSON values with optional expiry.
///
/// Implementations must be thread-safe. A missing or expired key reads as
/// `None`; the remote implementation additionally degrades to a miss when
/// the backend is unreachable.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process map
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on hit
    /// - `Ok(None)` on miss or expiry
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Stores a value.
    ///
    /// # Arguments
    ///
    /// - `key` - cache key, namespaced by the implementation
    /// - `value` - JSON value to store
    /// - `ttl` - lifetime; `None` keeps the entry until deleted
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes a value. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
