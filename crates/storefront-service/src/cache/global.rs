//! Process-wide cache client.
//!
//! Initialised once at startup by the composition root. Code that cannot be
//! handed a [`CacheStore`] explicitly reads it from here; before `init` (or
//! after `shutdown`) it gets a disabled store and every read misses.

use super::CacheStore;
use parking_lot::{const_rwlock, RwLock};
use storefront_core::{StorefrontError, StorefrontResult};
use tracing::info;

static GLOBAL_CACHE: RwLock<Option<CacheStore>> = const_rwlock(None);

/// Installs the process-wide store. Fails if one is already installed.
pub fn init(store: CacheStore) -> StorefrontResult<()> {
    let mut slot = GLOBAL_CACHE.write();
    if slot.is_some() {
        return Err(StorefrontError::Configuration(
            "Global cache client is already initialised".to_string(),
        ));
    }

    info!("Global cache client initialised (enabled: {})", store.is_enabled());
    *slot = Some(store);
    Ok(())
}

/// Returns the installed store, or a disabled one.
#[must_use]
pub fn get() -> CacheStore {
    GLOBAL_CACHE
        .read()
        .clone()
        .unwrap_or_else(CacheStore::disabled)
}

#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL_CACHE.read().is_some()
}

/// Removes the installed store so a later `init` can succeed.
pub fn shutdown() -> Option<CacheStore> {
    let previous = GLOBAL_CACHE.write().take();
    if previous.is_some() {
        info!("Global cache client shut down");
    }
    previous
}
