//! Cache-aside catalog reads with invalidate-on-write.
//!
//! Every entity has one canonical key per way it can be addressed (id, slug,
//! listing). Reads fill those keys from the repositories with the catalog
//! TTL. Writes commit to the database first, then drop every key the old or
//! new version of the entity could be found under, then optionally write
//! the fresh entity back.

use crate::cache::{CacheKeys, CacheStore};
use std::sync::Arc;
use std::time::Duration;
use storefront_config::CacheConfig;
use storefront_core::{
    Category, CategoryId, Product, ProductId, RatingSummary, StorefrontError, StorefrontResult,
};
use storefront_repository::{CategoryRepository, ProductRepository, RatingRepository};
use tracing::{debug, info};

/// Catalog read model backed by the cache.
pub struct CatalogCache {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    ratings: Arc<dyn RatingRepository>,
    cache: CacheStore,
    keys: CacheKeys,
    ttl: Duration,
    prepopulate_on_write: bool,
}

impl CatalogCache {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        ratings: Arc<dyn RatingRepository>,
        cache: CacheStore,
        config: &CacheConfig,
    ) -> Self {
        Self {
            categories,
            products,
            ratings,
            cache,
            keys: CacheKeys::new(config.key_prefix.clone()),
            ttl: config.catalog_ttl(),
            prepopulate_on_write: config.prepopulate_on_write,
        }
    }

    // ============ Categories ============

    pub async fn category_by_id(&self, id: CategoryId) -> StorefrontResult<Category> {
        let categories = &self.categories;
        self.cache
            .get_or_load(&self.keys.category_by_id(id), Some(self.ttl), || {
                categories.find_by_id(id)
            })
            .await?
            .ok_or_else(|| StorefrontError::not_found("Category", id))
    }

    pub async fn category_by_slug(&self, slug: &str) -> StorefrontResult<Category> {
        let categories = &self.categories;
        self.cache
            .get_or_load(&self.keys.category_by_slug(slug), Some(self.ttl), || {
                categories.find_by_slug(slug)
            })
            .await?
            .ok_or_else(|| StorefrontError::not_found("Category", slug))
    }

    pub async fn list_categories(&self) -> StorefrontResult<Vec<Category>> {
        let categories = &self.categories;
        let listed = self
            .cache
            .get_or_load(&self.keys.category_list(), Some(self.ttl), || async {
                categories.find_all().await.map(Some)
            })
            .await?;
        Ok(listed.unwrap_or_default())
    }

    pub async fn create_category(&self, category: Category) -> StorefrontResult<Category> {
        category.validate()?;

        let saved = self.categories.save(&category).await?;
        self.cache.delete(&self.keys.category_list()).await;
        self.drop_category_keys(&saved).await;
        self.prepopulate_category(&saved).await;

        info!("Category created: {} ({})", saved.id, saved.slug);
        Ok(saved)
    }

    pub async fn update_category(&self, mut category: Category) -> StorefrontResult<Category> {
        category.validate()?;

        let previous = self
            .categories
            .find_by_id(category.id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Category", category.id))?;

        category.created_at = previous.created_at;
        category.touch();
        let updated = self.categories.update(&category).await?;

        self.cache.delete(&self.keys.category_list()).await;
        self.drop_category_keys(&previous).await;
        self.drop_category_keys(&updated).await;
        self.prepopulate_category(&updated).await;

        info!("Category updated: {} ({} -> {})", updated.id, previous.slug, updated.slug);
        Ok(updated)
    }

    pub async fn delete_category(&self, id: CategoryId) -> StorefrontResult<()> {
        let previous = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Category", id))?;
        // Deleting the category detaches its products in the database.
        let detached = self.products.find_by_category(id).await?;

        if !self.categories.delete(id).await? {
            return Err(StorefrontError::not_found("Category", id));
        }

        self.cache
            .delete_many([
                self.keys.category_list(),
                self.keys.products_in_category(id),
                self.keys.product_list(),
            ])
            .await;
        self.drop_category_keys(&previous).await;
        for product in &detached {
            self.drop_product_keys(product).await;
        }

        info!("Category deleted: {} ({} products detached)", id, detached.len());
        Ok(())
    }

    async fn drop_category_keys(&self, category: &Category) {
        self.cache
            .delete_many([
                self.keys.category_by_id(category.id),
                self.keys.category_by_slug(&category.slug),
            ])
            .await;
    }

    async fn prepopulate_category(&self, category: &Category) {
        if !self.prepopulate_on_write {
            return;
        }
        let ttl = Some(self.ttl);
        self.cache.set_json(&self.keys.category_by_id(category.id), category, ttl).await;
        self.cache.set_json(&self.keys.category_by_slug(&category.slug), category, ttl).await;
    }

    // ============ Products ============

    pub async fn product_by_id(&self, id: ProductId) -> StorefrontResult<Product> {
        let products = &self.products;
        self.cache
            .get_or_load(&self.keys.product_by_id(id), Some(self.ttl), || products.find_by_id(id))
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", id))
    }

    pub async fn product_by_slug(&self, slug: &str) -> StorefrontResult<Product> {
        let products = &self.products;
        self.cache
            .get_or_load(&self.keys.product_by_slug(slug), Some(self.ttl), || {
                products.find_by_slug(slug)
            })
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", slug))
    }

    pub async fn list_products(&self) -> StorefrontResult<Vec<Product>> {
        let products = &self.products;
        let listed = self
            .cache
            .get_or_load(&self.keys.product_list(), Some(self.ttl), || async {
                products.find_all().await.map(Some)
            })
            .await?;
        Ok(listed.unwrap_or_default())
    }

    pub async fn products_in_category(&self, category_id: CategoryId) -> StorefrontResult<Vec<Product>> {
        let products = &self.products;
        let listed = self
            .cache
            .get_or_load(
                &self.keys.products_in_category(category_id),
                Some(self.ttl),
                || async { products.find_by_category(category_id).await.map(Some) },
            )
            .await?;
        Ok(listed.unwrap_or_default())
    }

    pub async fn create_product(&self, product: Product) -> StorefrontResult<Product> {
        product.validate()?;
        self.ensure_category_exists(product.category_id).await?;

        let saved = self.products.save(&product).await?;
        self.drop_product_list_keys(None, &saved).await;
        self.drop_product_keys(&saved).await;
        self.prepopulate_product(&saved).await;

        info!("Product created: {} ({})", saved.id, saved.slug);
        Ok(saved)
    }

    pub async fn update_product(&self, mut product: Product) -> StorefrontResult<Product> {
        product.validate()?;

        let previous = self
            .products
            .find_by_id(product.id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", product.id))?;
        if product.category_id != previous.category_id {
            self.ensure_category_exists(product.category_id).await?;
        }

        product.created_at = previous.created_at;
        product.touch();
        let updated = self.products.update(&product).await?;

        self.drop_product_list_keys(Some(&previous), &updated).await;
        self.drop_product_keys(&previous).await;
        self.drop_product_keys(&updated).await;
        self.prepopulate_product(&updated).await;

        info!("Product updated: {} ({} -> {})", updated.id, previous.slug, updated.slug);
        Ok(updated)
    }

    pub async fn delete_product(&self, id: ProductId) -> StorefrontResult<()> {
        let previous = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Product", id))?;

        if !self.products.delete(id).await? {
            return Err(StorefrontError::not_found("Product", id));
        }

        self.drop_product_list_keys(None, &previous).await;
        self.drop_product_keys(&previous).await;
        self.cache.delete(&self.keys.rating_summary(id)).await;

        info!("Product deleted: {}", id);
        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: Option<CategoryId>) -> StorefrontResult<()> {
        if let Some(category_id) = category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(StorefrontError::not_found("Category", category_id));
            }
        }
        Ok(())
    }

    /// Drops the full listing and the category listings of both versions.
    async fn drop_product_list_keys(&self, previous: Option<&Product>, current: &Product) {
        let mut keys = vec![self.keys.product_list()];
        let categories = previous
            .and_then(|p| p.category_id)
            .into_iter()
            .chain(current.category_id);
        for category_id in categories {
            let key = self.keys.products_in_category(category_id);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        self.cache.delete_many(keys).await;
    }

    async fn drop_product_keys(&self, product: &Product) {
        self.cache
            .delete_many([
                self.keys.product_by_id(product.id),
                self.keys.product_by_slug(&product.slug),
            ])
            .await;
    }

    async fn prepopulate_product(&self, product: &Product) {
        if !self.prepopulate_on_write {
            return;
        }
        let ttl = Some(self.ttl);
        self.cache.set_json(&self.keys.product_by_id(product.id), product, ttl).await;
        self.cache.set_json(&self.keys.product_by_slug(&product.slug), product, ttl).await;
    }

    // ============ Ratings ============

    /// Rating aggregate of a product.
    ///
    /// Cached without TTL: review writes call
    /// [`invalidate_rating_summary`](Self::invalidate_rating_summary).
    pub async fn rating_summary(&self, product_id: ProductId) -> StorefrontResult<RatingSummary> {
        let ratings = &self.ratings;
        let summary = self
            .cache
            .get_or_load(&self.keys.rating_summary(product_id), None, || async {
                ratings.summary(product_id).await.map(Some)
            })
            .await?;
        Ok(summary.unwrap_or_else(|| RatingSummary::empty(product_id)))
    }

    pub async fn invalidate_rating_summary(&self, product_id: ProductId) {
        debug!("Invalidating rating summary for product {}", product_id);
        self.cache.delete(&self.keys.rating_summary(product_id)).await;
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("ttl", &self.ttl)
            .field("prepopulate_on_write", &self.prepopulate_on_write)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FailingCache, InMemoryCategoryRepository, InMemoryProductRepository, InMemoryRatingRepository,
    };
    use std::sync::atomic::Ordering;

    struct Fixture {
        categories: Arc<InMemoryCategoryRepository>,
        products: Arc<InMemoryProductRepository>,
        ratings: Arc<InMemoryRatingRepository>,
        catalog: CatalogCache,
    }

    fn fixture_with(cache: CacheStore, prepopulate_on_write: bool) -> Fixture {
        let categories = Arc::new(InMemoryCategoryRepository::default());
        let products = Arc::new(InMemoryProductRepository::default());
        let ratings = Arc::new(InMemoryRatingRepository::default());
        let config = CacheConfig {
            prepopulate_on_write,
            ..CacheConfig::default()
        };
        let catalog = CatalogCache::new(
            categories.clone(),
            products.clone(),
            ratings.clone(),
            cache,
            &config,
        );
        Fixture {
            categories,
            products,
            ratings,
            catalog,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(CacheStore::in_memory(), true)
    }

    fn category(slug: &str) -> Category {
        Category::new("Outdoor".to_string(), slug.to_string(), None)
    }

    fn product(slug: &str, category_id: Option<CategoryId>) -> Product {
        Product::new("Tent".to_string(), slug.to_string(), category_id, 19_900, 2)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let f = fixture_with(CacheStore::in_memory(), false);
        let created = f.catalog.create_category(category("outdoor")).await.unwrap();

        f.catalog.category_by_id(created.id).await.unwrap();
        f.catalog.category_by_id(created.id).await.unwrap();

        assert_eq!(f.categories.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let f = fixture();
        let missing = ProductId::new();

        for _ in 0..2 {
            let err = f.catalog.product_by_id(missing).await.unwrap_err();
            assert!(matches!(err, StorefrontError::NotFound { .. }));
        }

        assert_eq!(f.products.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slug_rename_drops_old_slug() {
        let f = fixture();
        let mut created = f.catalog.create_category(category("old")).await.unwrap();
        assert_eq!(f.catalog.category_by_slug("old").await.unwrap().id, created.id);

        created.slug = "new".to_string();
        f.catalog.update_category(created.clone()).await.unwrap();

        let err = f.catalog.category_by_slug("old").await.unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound { .. }));

        let fresh = f.catalog.category_by_slug("new").await.unwrap();
        assert_eq!(fresh.id, created.id);
        assert_eq!(fresh.slug, "new");
    }

    #[tokio::test]
    async fn test_prepopulate_serves_fresh_entity_without_db_read() {
        let f = fixture();
        let created = f.catalog.create_product(product("tent", None)).await.unwrap();

        let by_id = f.catalog.product_by_id(created.id).await.unwrap();
        let by_slug = f.catalog.product_by_slug("tent").await.unwrap();

        assert_eq!(by_id, created);
        assert_eq!(by_slug, created);
        assert_eq!(f.products.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_without_prepopulate_rereads() {
        let f = fixture_with(CacheStore::in_memory(), false);
        let mut created = f.catalog.create_product(product("tent", None)).await.unwrap();
        f.catalog.product_by_id(created.id).await.unwrap();

        created.price_cents = 17_500;
        f.catalog.update_product(created.clone()).await.unwrap();
        let reads_before = f.products.reads.load(Ordering::SeqCst);

        let fresh = f.catalog.product_by_id(created.id).await.unwrap();
        assert_eq!(fresh.price_cents, 17_500);
        assert_eq!(f.products.reads.load(Ordering::SeqCst), reads_before + 1);
    }

    #[tokio::test]
    async fn test_lists_are_invalidated_on_write() {
        let f = fixture();
        assert!(f.catalog.list_categories().await.unwrap().is_empty());

        f.catalog.create_category(category("outdoor")).await.unwrap();
        assert_eq!(f.catalog.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_moving_product_invalidates_both_category_lists() {
        let f = fixture();
        let tents = f.catalog.create_category(category("tents")).await.unwrap();
        let lamps = f.catalog.create_category(category("lamps")).await.unwrap();
        let mut created = f.catalog.create_product(product("tent", Some(tents.id))).await.unwrap();

        assert_eq!(f.catalog.products_in_category(tents.id).await.unwrap().len(), 1);
        assert!(f.catalog.products_in_category(lamps.id).await.unwrap().is_empty());

        created.category_id = Some(lamps.id);
        f.catalog.update_product(created).await.unwrap();

        assert!(f.catalog.products_in_category(tents.id).await.unwrap().is_empty());
        assert_eq!(f.catalog.products_in_category(lamps.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_product_in_unknown_category() {
        let f = fixture();
        let err = f
            .catalog
            .create_product(product("tent", Some(CategoryId::new())))
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::NotFound { resource_type: "Category", .. }));
    }

    #[tokio::test]
    async fn test_delete_product_evicts_entity() {
        let f = fixture();
        let created = f.catalog.create_product(product("tent", None)).await.unwrap();

        f.catalog.delete_product(created.id).await.unwrap();

        assert!(f.catalog.product_by_id(created.id).await.is_err());
        assert!(f.catalog.product_by_slug("tent").await.is_err());
        assert!(f.catalog.delete_product(created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_category_evicts_its_products() {
        let f = fixture();
        let tents = f.catalog.create_category(category("tents")).await.unwrap();
        let created = f.catalog.create_product(product("tent", Some(tents.id))).await.unwrap();
        assert_eq!(f.catalog.product_by_id(created.id).await.unwrap().category_id, Some(tents.id));

        f.catalog.delete_category(tents.id).await.unwrap();
        // The foreign key nulls the product's category.
        let detached = Product {
            category_id: None,
            ..created.clone()
        };
        f.products.update(&detached).await.unwrap();

        assert_eq!(f.catalog.product_by_id(created.id).await.unwrap().category_id, None);
        assert_eq!(f.catalog.product_by_slug("tent").await.unwrap().category_id, None);
    }

    #[tokio::test]
    async fn test_rating_summary_cached_until_invalidated() {
        let f = fixture();
        let product_id = ProductId::new();

        assert_eq!(f.catalog.rating_summary(product_id).await.unwrap().count, 0);

        f.ratings.set(RatingSummary {
            product_id,
            average: 5.0,
            count: 1,
        });
        assert_eq!(f.catalog.rating_summary(product_id).await.unwrap().count, 0);

        f.catalog.invalidate_rating_summary(product_id).await;
        assert_eq!(f.catalog.rating_summary(product_id).await.unwrap().count, 1);
        assert_eq!(f.ratings.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_entity_is_rejected_before_write() {
        let f = fixture();
        let err = f.catalog.create_category(category("Not A Slug")).await.unwrap_err();

        assert!(matches!(err, StorefrontError::Validation(_)));
        assert!(f.catalog.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_cache_is_invisible() {
        let f = fixture_with(CacheStore::new(Arc::new(FailingCache)), true);

        let created = f.catalog.create_category(category("outdoor")).await.unwrap();
        let found = f.catalog.category_by_slug("outdoor").await.unwrap();
        assert_eq!(found.id, created.id);

        f.catalog.delete_category(created.id).await.unwrap();
        assert!(f.catalog.category_by_id(created.id).await.is_err());
    }
}
