//! Wishlist membership for guests and authenticated users.
//!
//! Guest wishlists live only in the cache under the session key; losing the
//! cache loses them. User wishlists are cached without TTL and written
//! through to the durable table, which stays the source of truth.

use crate::cache::{CacheKeys, CacheStore};
use std::sync::Arc;
use storefront_config::WishlistConfig;
use storefront_core::{Owner, ProductId, StorefrontError, StorefrontResult, WishlistSet};
use storefront_repository::{ProductRepository, WishlistRepository};
use tracing::{debug, info, warn};

/// Wishlist operations over the cache and the durable wishlist table.
pub struct WishlistCache {
    products: Arc<dyn ProductRepository>,
    wishlists: Arc<dyn WishlistRepository>,
    cache: CacheStore,
    keys: CacheKeys,
    max_items: usize,
}

impl WishlistCache {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        wishlists: Arc<dyn WishlistRepository>,
        cache: CacheStore,
        keys: CacheKeys,
        config: &WishlistConfig,
    ) -> Self {
        Self {
            products,
            wishlists,
            cache,
            keys,
            max_items: config.max_items,
        }
    }

    #[must_use]
    pub const fn max_items(&self) -> usize {
        self.max_items
    }

    /// Current members. A guest with nothing cached has an empty wishlist.
    pub async fn list(&self, owner: &Owner) -> StorefrontResult<WishlistSet> {
        let key = self.keys.wishlist(owner);
        match owner {
            Owner::Guest(_) => Ok(self.cache.get_json(&key).await.unwrap_or_default()),
            Owner::User(user_id) => {
                let wishlists = &self.wishlists;
                let user_id = *user_id;
                let loaded = self
                    .cache
                    .get_or_load(&key, None, || async {
                        wishlists.list(user_id).await.map(Some)
                    })
                    .await?;
                Ok(loaded.unwrap_or_default())
            }
        }
    }

    /// Adds an active product.
    ///
    /// Fails with `NotFound` for an unknown product and `Conflict` when the
    /// product is inactive, already a member, or the wishlist is full.
    pub async fn add(&self, owner: &Owner, product_id: ProductId) -> StorefrontResult<WishlistSet> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", product_id))?;
        if !product.is_active {
            return Err(StorefrontError::conflict(format!(
                "Product {} is not available",
                product_id
            )));
        }

        let mut items = self.list(owner).await?;
        if items.contains(&product_id) {
            return Err(StorefrontError::conflict(format!(
                "Product {} is already on the wishlist",
                product_id
            )));
        }
        if items.len() >= self.max_items {
            return Err(StorefrontError::conflict(format!(
                "Wishlist is full ({} items)",
                self.max_items
            )));
        }

        items.insert(product_id);
        let key = self.keys.wishlist(owner);
        self.cache.set_json(&key, &items, None).await;

        if let Some(user_id) = owner.user_id() {
            if let Err(e) = self.wishlists.add(user_id, product_id).await {
                warn!("Wishlist write-through failed for {}: {}", owner, e);
                self.cache.delete(&key).await;
                return Err(e);
            }
        }

        debug!("Added product {} to wishlist of {}", product_id, owner);
        Ok(items)
    }

    /// Removes a product. Removing a non-member changes nothing.
    ///
    /// A user's durable row is deleted even when the cached set lacks the
    /// product, since the cached set may be stale.
    pub async fn remove(&self, owner: &Owner, product_id: ProductId) -> StorefrontResult<WishlistSet> {
        let mut items = self.list(owner).await?;
        let key = self.keys.wishlist(owner);
        if items.remove(&product_id) {
            self.cache.set_json(&key, &items, None).await;
        }

        if let Some(user_id) = owner.user_id() {
            if let Err(e) = self.wishlists.remove(user_id, product_id).await {
                warn!("Wishlist write-through failed for {}: {}", owner, e);
                self.cache.delete(&key).await;
                return Err(e);
            }
        }

        debug!("Removed product {} from wishlist of {}", product_id, owner);
        Ok(items)
    }

    /// Empties the wishlist.
    pub async fn clear(&self, owner: &Owner) -> StorefrontResult<()> {
        if let Some(user_id) = owner.user_id() {
            let removed = self.wishlists.clear(user_id).await?;
            info!("Cleared {} wishlist items of {}", removed, owner);
        }
        self.cache.delete(&self.keys.wishlist(owner)).await;
        Ok(())
    }
}

impl std::fmt::Debug for WishlistCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistCache")
            .field("max_items", &self.max_items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingCache, InMemoryProductRepository, InMemoryWishlistRepository};
    use std::sync::atomic::Ordering;
    use storefront_core::{GuestId, Product, UserId};
    use storefront_repository::MockWishlistRepository;

    fn products(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| Product::new(format!("Item {}", i), format!("item-{}", i), None, 100, 1))
            .collect()
    }

    fn service(
        catalog: &[Product],
        wishlists: Arc<dyn WishlistRepository>,
        cache: CacheStore,
    ) -> WishlistCache {
        WishlistCache::new(
            Arc::new(InMemoryProductRepository::with_products(catalog.to_vec())),
            wishlists,
            cache,
            CacheKeys::default(),
            &WishlistConfig::default(),
        )
    }

    fn guest() -> Owner {
        Owner::Guest(GuestId::new("session-abc").unwrap())
    }

    #[tokio::test]
    async fn test_guest_paths_never_touch_the_durable_table() {
        let catalog = products(2);
        // No expectations: any call on the mock panics.
        let wishlists = Arc::new(MockWishlistRepository::new());
        let service = service(&catalog, wishlists, CacheStore::in_memory());
        let owner = guest();

        assert!(service.list(&owner).await.unwrap().is_empty());
        service.add(&owner, catalog[0].id).await.unwrap();
        service.add(&owner, catalog[1].id).await.unwrap();
        service.remove(&owner, catalog[0].id).await.unwrap();

        let items = service.list(&owner).await.unwrap();
        assert_eq!(items.to_vec(), vec![catalog[1].id]);

        service.clear(&owner).await.unwrap();
        assert!(service.list(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_add_writes_through() {
        let catalog = products(1);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let service = service(&catalog, repo.clone(), CacheStore::in_memory());
        let user = UserId::new();

        service.add(&Owner::User(user), catalog[0].id).await.unwrap();

        assert!(repo.stored(user).contains(&catalog[0].id));
    }

    #[tokio::test]
    async fn test_user_list_miss_loads_durable_table() {
        let catalog = products(1);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let user = UserId::new();
        repo.add(user, catalog[0].id).await.unwrap();

        let cache = CacheStore::in_memory();
        let service = service(&catalog, repo, cache.clone());
        let owner = Owner::User(user);

        let items = service.list(&owner).await.unwrap();
        assert!(items.contains(&catalog[0].id));
        assert!(cache.exists(&CacheKeys::default().wishlist(&owner)).await);
    }

    #[tokio::test]
    async fn test_cap_is_enforced() {
        let catalog = products(26);
        let service = service(
            &catalog,
            Arc::new(InMemoryWishlistRepository::default()),
            CacheStore::in_memory(),
        );
        let owner = Owner::User(UserId::new());

        for product in &catalog[..25] {
            service.add(&owner, product.id).await.unwrap();
        }
        let err = service.add(&owner, catalog[25].id).await.unwrap_err();

        assert!(matches!(err, StorefrontError::Conflict(_)));
        assert_eq!(service.list(&owner).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_add_rejections() {
        let mut catalog = products(2);
        catalog[1].is_active = false;
        let service = service(
            &catalog,
            Arc::new(InMemoryWishlistRepository::default()),
            CacheStore::in_memory(),
        );
        let owner = guest();

        let missing = service.add(&owner, ProductId::new()).await.unwrap_err();
        assert!(matches!(missing, StorefrontError::NotFound { .. }));

        let inactive = service.add(&owner, catalog[1].id).await.unwrap_err();
        assert!(matches!(inactive, StorefrontError::Conflict(_)));

        service.add(&owner, catalog[0].id).await.unwrap();
        let duplicate = service.add(&owner, catalog[0].id).await.unwrap_err();
        assert!(matches!(duplicate, StorefrontError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_write_through_invalidates_cache() {
        let catalog = products(2);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let service = service(&catalog, repo.clone(), CacheStore::in_memory());
        let owner = Owner::User(UserId::new());

        service.add(&owner, catalog[0].id).await.unwrap();

        repo.fail_writes.store(true, Ordering::SeqCst);
        let err = service.add(&owner, catalog[1].id).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Database(_)));

        repo.fail_writes.store(false, Ordering::SeqCst);
        let items = service.list(&owner).await.unwrap();
        assert_eq!(items.to_vec(), vec![catalog[0].id]);
    }

    #[tokio::test]
    async fn test_remove_non_member_is_a_no_op() {
        let catalog = products(1);
        let service = service(
            &catalog,
            Arc::new(InMemoryWishlistRepository::default()),
            CacheStore::in_memory(),
        );
        let owner = Owner::User(UserId::new());

        let items = service.remove(&owner, catalog[0].id).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_with_stale_user_cache_deletes_durable_row() {
        let catalog = products(1);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let user = UserId::new();
        repo.add(user, catalog[0].id).await.unwrap();

        let cache = CacheStore::in_memory();
        let owner = Owner::User(user);
        let key = CacheKeys::default().wishlist(&owner);
        cache.set_json(&key, &WishlistSet::default(), None).await;

        let service = service(&catalog, repo.clone(), cache.clone());
        let items = service.remove(&owner, catalog[0].id).await.unwrap();

        assert!(items.is_empty());
        assert!(repo.stored(user).is_empty());

        cache.delete(&key).await;
        assert!(service.list(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_user_removes_rows_and_key() {
        let catalog = products(2);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let service = service(&catalog, repo.clone(), CacheStore::in_memory());
        let user = UserId::new();
        let owner = Owner::User(user);

        service.add(&owner, catalog[0].id).await.unwrap();
        service.add(&owner, catalog[1].id).await.unwrap();
        service.clear(&owner).await.unwrap();

        assert!(repo.stored(user).is_empty());
        assert!(service.list(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_wishlist_survives_cache_outage() {
        let catalog = products(1);
        let repo = Arc::new(InMemoryWishlistRepository::default());
        let service = service(&catalog, repo, CacheStore::new(Arc::new(FailingCache)));
        let owner = Owner::User(UserId::new());

        service.add(&owner, catalog[0].id).await.unwrap();

        let items = service.list(&owner).await.unwrap();
        assert!(items.contains(&catalog[0].id));
    }
}
