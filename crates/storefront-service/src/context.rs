//! Composition root.
//!
//! Wires configuration, the MySQL pool, the cache backend, and every
//! service into one value the embedding application holds on to.

use crate::cache::{global, CacheKeys, CacheStore, RedisCacheService};
use crate::{CatalogCache, ReconciliationService, SequenceGenerator, WishlistCache};
use std::sync::Arc;
use storefront_config::{AppConfig, CacheBackend, CacheConfig, ConfigLoader, RedisConfig};
use storefront_core::{telemetry, StorefrontResult};
use storefront_repository::{
    DatabasePool, MySqlCategoryRepository, MySqlProductRepository, MySqlRatingRepository,
    MySqlSequenceStore, MySqlWishlistRepository,
};
use storefront_resilience::RetryPolicy;
use tracing::{info, warn};

/// Attempts made to reach MySQL at startup.
const DATABASE_CONNECT_ATTEMPTS: u32 = 5;

/// Every storefront service, ready to use.
pub struct StorefrontContext {
    pub pool: Arc<DatabasePool>,
    pub cache: CacheStore,
    pub sequence: Arc<SequenceGenerator>,
    pub catalog: Arc<CatalogCache>,
    pub wishlist: Arc<WishlistCache>,
    pub reconciliation: Arc<ReconciliationService>,
}

impl StorefrontContext {
    /// Loads configuration from `config_dir`, installs the tracing
    /// subscriber, and builds the context.
    pub async fn bootstrap(config_dir: &str) -> StorefrontResult<Self> {
        let config = ConfigLoader::new(config_dir)?.get().await;
        telemetry::init_tracing(&config.observability)?;
        Self::build(&config).await
    }

    /// Connects to MySQL and the cache and builds every service.
    pub async fn build(config: &AppConfig) -> StorefrontResult<Self> {
        info!(
            "Building storefront context ({} v{}, {})",
            config.app.name, config.app.version, config.app.environment
        );

        let retry = RetryPolicy::with_max_attempts(DATABASE_CONNECT_ATTEMPTS);
        let pool = retry.execute(|| DatabasePool::new(&config.database)).await?;
        if config.database.run_migrations {
            pool.run_migrations().await?;
        }

        let cache = connect_cache(&config.cache, &config.redis).await;
        Self::assemble(Arc::new(pool), cache, config)
    }

    /// Builds every service over an existing pool and cache.
    pub fn assemble(pool: Arc<DatabasePool>, cache: CacheStore, config: &AppConfig) -> StorefrontResult<Self> {
        let keys = CacheKeys::new(config.cache.key_prefix.clone());

        let products = Arc::new(MySqlProductRepository::new(Arc::clone(&pool)));
        let wishlists = Arc::new(MySqlWishlistRepository::new(Arc::clone(&pool)));

        let sequence = SequenceGenerator::from_config(
            Arc::new(MySqlSequenceStore::new(Arc::clone(&pool))),
            &config.sequence,
        )?;
        let catalog = CatalogCache::new(
            Arc::new(MySqlCategoryRepository::new(Arc::clone(&pool))),
            products.clone(),
            Arc::new(MySqlRatingRepository::new(Arc::clone(&pool))),
            cache.clone(),
            &config.cache,
        );
        let wishlist = WishlistCache::new(
            products,
            wishlists.clone(),
            cache.clone(),
            keys.clone(),
            &config.wishlist,
        );
        let reconciliation = ReconciliationService::new(wishlists, cache.clone(), keys, &config.wishlist);

        Ok(Self {
            pool,
            cache,
            sequence: Arc::new(sequence),
            catalog: Arc::new(catalog),
            wishlist: Arc::new(wishlist),
            reconciliation: Arc::new(reconciliation),
        })
    }

    /// Installs this context's cache as the process-wide client.
    pub fn install_global_cache(&self) -> StorefrontResult<()> {
        global::init(self.cache.clone())
    }

    /// Releases the process-wide cache client and closes the pool.
    pub async fn shutdown(&self) {
        global::shutdown();
        self.pool.close().await;
    }
}

/// The configured cache backend.
///
/// Disabled or unreachable Redis leaves caching disabled instead of failing
/// startup; every read then goes to MySQL.
async fn connect_cache(cache: &CacheConfig, redis: &RedisConfig) -> CacheStore {
    if cache.backend == CacheBackend::Memory {
        warn!("Using process-local cache; not coherent across instances");
        return CacheStore::in_memory();
    }
    if !redis.enabled {
        info!("Redis disabled; caching is off");
        return CacheStore::disabled();
    }

    match RedisCacheService::connect(redis).await {
        Ok(redis) => CacheStore::new(Arc::new(redis)),
        Err(e) => {
            warn!("Redis unavailable, continuing without cache: {}", e);
            CacheStore::disabled()
        }
    }
}

impl std::fmt::Debug for StorefrontContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontContext")
            .field("pool", &self.pool)
            .field("cache", &self.cache)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
