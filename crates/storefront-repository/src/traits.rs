//! Repository trait definitions.

use async_trait::async_trait;
use storefront_core::{
    Category, CategoryId, DateKey, Product, ProductId, RatingSummary, StorefrontResult, UserId,
    WishlistSet,
};

/// Durable per-day order counters.
///
/// Implementations must be safe to share between processes: every method is
/// a single round trip whose atomicity is provided by the backing store.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter for `date_key` and returns the new value,
    /// creating the record at 1 when absent.
    ///
    /// Returns `Ok(None)` when the store has no atomic primitive available,
    /// in which case callers fall back to [`read`](Self::read) and
    /// [`compare_and_swap`](Self::compare_and_swap).
    async fn atomic_increment(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>>;

    /// Reads the current counter, `None` if no order has been numbered that day.
    async fn read(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>>;

    /// Creates the record with `counter` unless one already exists.
    async fn insert_if_absent(&self, date_key: &DateKey, counter: u64) -> StorefrontResult<bool>;

    /// Sets the counter to `new` only if it still equals `expected`.
    async fn compare_and_swap(&self, date_key: &DateKey, expected: u64, new: u64) -> StorefrontResult<bool>;
}

/// Category repository trait.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Finds a category by ID.
    async fn find_by_id(&self, id: CategoryId) -> StorefrontResult<Option<Category>>;

    /// Finds a category by slug.
    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Category>>;

    /// Lists all categories ordered by name.
    async fn find_all(&self) -> StorefrontResult<Vec<Category>>;

    /// Saves a new category.
    async fn save(&self, category: &Category) -> StorefrontResult<Category>;

    /// Updates an existing category.
    async fn update(&self, category: &Category) -> StorefrontResult<Category>;

    /// Deletes a category by ID.
    async fn delete(&self, id: CategoryId) -> StorefrontResult<bool>;
}

/// Product repository trait.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Finds a product by ID.
    async fn find_by_id(&self, id: ProductId) -> StorefrontResult<Option<Product>>;

    /// Finds a product by slug.
    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Product>>;

    /// Lists all products ordered by name.
    async fn find_all(&self) -> StorefrontResult<Vec<Product>>;

    /// Lists the products of one category.
    async fn find_by_category(&self, category_id: CategoryId) -> StorefrontResult<Vec<Product>>;

    /// Saves a new product.
    async fn save(&self, product: &Product) -> StorefrontResult<Product>;

    /// Updates an existing product.
    async fn update(&self, product: &Product) -> StorefrontResult<Product>;

    /// Deletes a product by ID.
    async fn delete(&self, id: ProductId) -> StorefrontResult<bool>;
}

/// Read access to review aggregates.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Computes the rating summary of a product.
    async fn summary(&self, product_id: ProductId) -> StorefrontResult<RatingSummary>;
}

/// Durable wishlist table for authenticated owners.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Loads the wishlist of a user.
    async fn list(&self, user_id: UserId) -> StorefrontResult<WishlistSet>;

    /// Adds one product. Returns false if the pair already existed.
    async fn add(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool>;

    /// Adds every product in `items`, ignoring pairs that already exist.
    /// Returns the number of rows inserted.
    async fn add_all(&self, user_id: UserId, items: &WishlistSet) -> StorefrontResult<u64>;

    /// Removes one product. Returns false if it was not present.
    async fn remove(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool>;

    /// Removes every product of a user. Returns the number of rows deleted.
    async fn clear(&self, user_id: UserId) -> StorefrontResult<u64>;
}
