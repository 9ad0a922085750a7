//! In-memory fakes shared by the service tests.

use crate::cache::CacheInterface;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use storefront_core::{
    Category, CategoryId, DateKey, Product, ProductId, RatingSummary, StorefrontError,
    StorefrontResult, UserId, WishlistSet,
};
use storefront_repository::{
    CategoryRepository, ProductRepository, RatingRepository, SequenceStore, WishlistRepository,
};

/// Cache backend whose every call fails.
pub(crate) struct FailingCache;

fn refused<T>() -> StorefrontResult<T> {
    Err(StorefrontError::Cache("connection refused".to_string()))
}

#[async_trait]
impl CacheInterface for FailingCache {
    async fn get_raw(&self, _key: &str) -> StorefrontResult<Option<String>> {
        refused()
    }

    async fn set_raw(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> StorefrontResult<()> {
        refused()
    }

    async fn delete(&self, _key: &str) -> StorefrontResult<bool> {
        refused()
    }

    async fn exists(&self, _key: &str) -> StorefrontResult<bool> {
        refused()
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Sequence store over a map. With `atomic = false` it reports no atomic
/// primitive, forcing callers onto compare-and-swap.
pub(crate) struct InMemorySequenceStore {
    counters: Mutex<HashMap<DateKey, u64>>,
    atomic: bool,
    pub(crate) atomic_calls: AtomicUsize,
}

impl InMemorySequenceStore {
    pub(crate) fn atomic() -> Self {
        Self::with_atomic(true)
    }

    pub(crate) fn cas_only() -> Self {
        Self::with_atomic(false)
    }

    fn with_atomic(atomic: bool) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            atomic,
            atomic_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn atomic_increment(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>> {
        self.atomic_calls.fetch_add(1, Ordering::SeqCst);
        if !self.atomic {
            return Ok(None);
        }
        let mut counters = self.counters.lock().unwrap();
        let counter = counters.entry(date_key.clone()).or_insert(0);
        *counter += 1;
        Ok(Some(*counter))
    }

    async fn read(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>> {
        tokio::task::yield_now().await;
        Ok(self.counters.lock().unwrap().get(date_key).copied())
    }

    async fn insert_if_absent(&self, date_key: &DateKey, counter: u64) -> StorefrontResult<bool> {
        let mut counters = self.counters.lock().unwrap();
        if counters.contains_key(date_key) {
            return Ok(false);
        }
        counters.insert(date_key.clone(), counter);
        Ok(true)
    }

    async fn compare_and_swap(&self, date_key: &DateKey, expected: u64, new: u64) -> StorefrontResult<bool> {
        let mut counters = self.counters.lock().unwrap();
        match counters.get_mut(date_key) {
            Some(current) if *current == expected => {
                *current = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Category table over a map, counting lookups that reach it.
#[derive(Default)]
pub(crate) struct InMemoryCategoryRepository {
    categories: Mutex<HashMap<CategoryId, Category>>,
    pub(crate) reads: AtomicUsize,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> StorefrontResult<Option<Category>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.categories.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Category>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .categories
            .lock()
            .unwrap()
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_all(&self) -> StorefrontResult<Vec<Category>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut all: Vec<Category> = self.categories.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn save(&self, category: &Category) -> StorefrontResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        if categories.values().any(|c| c.slug == category.slug) {
            return Err(StorefrontError::conflict(format!("Slug '{}' is taken", category.slug)));
        }
        categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> StorefrontResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        if !categories.contains_key(&category.id) {
            return Err(StorefrontError::not_found("Category", category.id));
        }
        categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> StorefrontResult<bool> {
        Ok(self.categories.lock().unwrap().remove(&id).is_some())
    }
}

/// Product table over a map, counting lookups that reach it.
#[derive(Default)]
pub(crate) struct InMemoryProductRepository {
    products: Mutex<HashMap<ProductId, Product>>,
    pub(crate) reads: AtomicUsize,
}

impl InMemoryProductRepository {
    pub(crate) fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.products.lock().unwrap();
            for product in products {
                map.insert(product.id, product);
            }
        }
        repo
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: ProductId) -> StorefrontResult<Option<Product>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Product>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn find_all(&self) -> StorefrontResult<Vec<Product>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut all: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_category(&self, category_id: CategoryId) -> StorefrontResult<Vec<Product>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut all: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.category_id == Some(category_id))
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn save(&self, product: &Product) -> StorefrontResult<Product> {
        self.products.lock().unwrap().insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> StorefrontResult<Product> {
        let mut products = self.products.lock().unwrap();
        if !products.contains_key(&product.id) {
            return Err(StorefrontError::not_found("Product", product.id));
        }
        products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> StorefrontResult<bool> {
        Ok(self.products.lock().unwrap().remove(&id).is_some())
    }
}

/// Fixed rating aggregates.
#[derive(Default)]
pub(crate) struct InMemoryRatingRepository {
    summaries: Mutex<HashMap<ProductId, RatingSummary>>,
    pub(crate) reads: AtomicUsize,
}

impl InMemoryRatingRepository {
    pub(crate) fn set(&self, summary: RatingSummary) {
        self.summaries.lock().unwrap().insert(summary.product_id, summary);
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn summary(&self, product_id: ProductId) -> StorefrontResult<RatingSummary> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .unwrap_or_else(|| RatingSummary::empty(product_id)))
    }
}

/// Wishlist table over a map. `fail_writes` makes every mutation fail.
#[derive(Default)]
pub(crate) struct InMemoryWishlistRepository {
    rows: Mutex<HashMap<UserId, WishlistSet>>,
    pub(crate) fail_writes: AtomicBool,
}

impl InMemoryWishlistRepository {
    pub(crate) fn stored(&self, user_id: UserId) -> WishlistSet {
        self.rows.lock().unwrap().get(&user_id).cloned().unwrap_or_default()
    }

    fn check_writable(&self) -> StorefrontResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorefrontError::Database("wishlist table unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn list(&self, user_id: UserId) -> StorefrontResult<WishlistSet> {
        Ok(self.stored(user_id))
    }

    async fn add(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool> {
        self.check_writable()?;
        Ok(self.rows.lock().unwrap().entry(user_id).or_default().insert(product_id))
    }

    async fn add_all(&self, user_id: UserId, items: &WishlistSet) -> StorefrontResult<u64> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let set = rows.entry(user_id).or_default();
        Ok(items.iter().filter(|id| set.insert(**id)).count() as u64)
    }

    async fn remove(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool> {
        self.check_writable()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get_mut(&user_id)
            .is_some_and(|set| set.remove(&product_id)))
    }

    async fn clear(&self, user_id: UserId) -> StorefrontResult<u64> {
        self.check_writable()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .remove(&user_id)
            .map_or(0, |set| set.len() as u64))
    }
}
