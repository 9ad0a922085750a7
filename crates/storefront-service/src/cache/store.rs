//! Best-effort cache facade.
//!
//! The cache is never a correctness dependency. Backend failures on reads
//! are treated as misses and failures on writes or deletes are logged and
//! swallowed, so callers only ever see the durable store's errors.

use super::{CacheInterface, InMemoryCacheService, RedisCacheService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storefront_core::StorefrontResult;
use tracing::{debug, warn};

/// Shared handle over a cache backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheInterface>,
}

impl CacheStore {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheInterface>) -> Self {
        Self { backend }
    }

    /// A store that caches nothing. Every read misses.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(RedisCacheService::disabled()))
    }

    /// A store backed by process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCacheService::new()))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }

    /// Returns the raw value, or `None` on miss or backend failure.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.get_raw(key).await {
            Ok(Some(value)) => {
                debug!("Cache hit for key '{}'", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                None
            }
            Err(e) => {
                warn!("Cache read failed for key '{}', treating as miss: {}", key, e);
                None
            }
        }
    }

    pub async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Err(e) = self.backend.set_raw(key, value, ttl).await {
            warn!("Cache write failed for key '{}': {}", key, e);
        }
    }

    /// Deletes a key. Returns `true` only if the backend confirmed a removal.
    pub async fn delete(&self, key: &str) -> bool {
        match self.backend.delete(key).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("Cache delete failed for key '{}': {}", key, e);
                false
            }
        }
    }

    pub async fn delete_many<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.delete(key.as_ref()).await;
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.backend.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Cache exists check failed for key '{}': {}", key, e);
                false
            }
        }
    }

    /// Reads and decodes a typed value.
    ///
    /// A value that no longer decodes is a miss; the stale key is removed.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry '{}': {}", key, e);
                self.delete(key).await;
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_string(value) {
            Ok(json) => self.set_raw(key, &json, ttl).await,
            Err(e) => warn!("Failed to encode cache entry '{}': {}", key, e),
        }
    }

    /// Cache-aside read.
    ///
    /// On a miss `load` is called. A found value is written back with `ttl`;
    /// `None` is returned to the caller but never cached.
    pub async fn get_or_load<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        load: F,
    ) -> StorefrontResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorefrontResult<Option<T>>>,
    {
        if let Some(cached) = self.get_json::<T>(key).await {
            return Ok(Some(cached));
        }

        let loaded = load().await?;
        if let Some(value) = &loaded {
            self.set_json(key, value, ttl).await;
        }

        Ok(loaded)
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FailingCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storefront_core::StorefrontError;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let store = CacheStore::in_memory();
        store.set_json("k", &vec![1, 2, 3], None).await;

        assert_eq!(store.get_json::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));
        assert!(store.exists("k").await);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_miss() {
        let store = CacheStore::in_memory();
        store.set_raw("k", "\"v\"", None).await;
        store.delete("k").await;
        store.delete("never-set").await;

        assert_eq!(store.get_raw("k").await, None);
        assert_eq!(store.get_raw("never-set").await, None);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss_and_removed() {
        let store = CacheStore::in_memory();
        store.set_raw("k", "not json", None).await;

        assert_eq!(store.get_json::<Vec<i32>>("k").await, None);
        assert!(!store.exists("k").await);
    }

    #[tokio::test]
    async fn test_failing_backend_is_invisible() {
        let store = CacheStore::new(Arc::new(FailingCache));

        store.set_json("k", &1, None).await;
        assert_eq!(store.get_json::<i32>("k").await, None);
        assert!(!store.delete("k").await);
        assert!(!store.exists("k").await);

        let loaded = store
            .get_or_load("k", None, || async { Ok(Some(7)) })
            .await
            .unwrap();
        assert_eq!(loaded, Some(7));
    }

    #[tokio::test]
    async fn test_get_or_load_fills_on_miss_only() {
        let store = CacheStore::in_memory();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = store
                .get_or_load("k", None, || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("fresh".to_string()))
                })
                .await
                .unwrap();
            assert_eq!(value.as_deref(), Some("fresh"));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_load_does_not_cache_absence() {
        let store = CacheStore::in_memory();

        let value: Option<String> = store.get_or_load("k", None, || async { Ok(None) }).await.unwrap();
        assert_eq!(value, None);
        assert!(!store.exists("k").await);
    }

    #[tokio::test]
    async fn test_get_or_load_propagates_loader_error() {
        let store = CacheStore::in_memory();

        let result: StorefrontResult<Option<String>> = store
            .get_or_load("k", None, || async { Err(StorefrontError::Database("down".to_string())) })
            .await;
        assert!(matches!(result, Err(StorefrontError::Database(_))));
    }
}
