//! Cache backend trait.

use async_trait::async_trait;
use std::time::Duration;
use storefront_core::StorefrontResult;

/// A key/value cache backend.
///
/// Values are JSON strings so the trait stays dyn-compatible. Backends
/// report their own failures; [`CacheStore`](super::CacheStore) decides
/// what callers get to see.
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Get a raw value. `None` if the key is absent or expired.
    async fn get_raw(&self, key: &str) -> StorefrontResult<Option<String>>;

    /// Set a raw value. `ttl = None` keeps the value until it is deleted.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> StorefrontResult<()>;

    /// Delete a key. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> StorefrontResult<bool>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> StorefrontResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}
