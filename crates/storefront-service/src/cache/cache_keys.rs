//! Cache key builder for consistent key naming.

use storefront_core::{CategoryId, Owner, ProductId};

/// Default namespace for all cache keys.
pub const DEFAULT_CACHE_PREFIX: &str = "storefront:cache";

/// Builds namespaced cache keys. One canonical key per projection.
#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PREFIX)
    }
}

impl CacheKeys {
    /// Create a new key builder with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Category by ID.
    #[must_use]
    pub fn category_by_id(&self, id: CategoryId) -> String {
        format!("{}:category:id:{}", self.prefix, id)
    }

    /// Category by slug.
    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> String {
        format!("{}:category:slug:{}", self.prefix, slug)
    }

    /// Full category listing.
    #[must_use]
    pub fn category_list(&self) -> String {
        format!("{}:categories:list", self.prefix)
    }

    /// Product by ID.
    #[must_use]
    pub fn product_by_id(&self, id: ProductId) -> String {
        format!("{}:product:id:{}", self.prefix, id)
    }

    /// Product by slug.
    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> String {
        format!("{}:product:slug:{}", self.prefix, slug)
    }

    /// Full product listing.
    #[must_use]
    pub fn product_list(&self) -> String {
        format!("{}:products:list", self.prefix)
    }

    /// Products of one category.
    #[must_use]
    pub fn products_in_category(&self, category_id: CategoryId) -> String {
        format!("{}:products:category:{}", self.prefix, category_id)
    }

    /// Rating aggregate of a product.
    #[must_use]
    pub fn rating_summary(&self, product_id: ProductId) -> String {
        format!("{}:rating:product:{}", self.prefix, product_id)
    }

    /// Wishlist of a guest session or an account.
    #[must_use]
    pub fn wishlist(&self, owner: &Owner) -> String {
        match owner {
            Owner::Guest(guest) => format!("{}:wishlist:guest:{}", self.prefix, guest),
            Owner::User(user) => format!("{}:wishlist:user:{}", self.prefix, user),
        }
    }
}
