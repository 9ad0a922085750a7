//! Catalog entities: categories, products, and rating aggregates.
//!
//! These are the canonical shapes stored in the cache. Public response
//! shapes are derived from them at the service boundary.

use crate::{CategoryId, ProductId, StorefrontError, StorefrontResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a catalog slug.
pub const MAX_SLUG_LENGTH: usize = 120;

/// Validates a URL slug: lowercase ASCII letters, digits, and single hyphens.
pub fn validate_slug(slug: &str) -> StorefrontResult<()> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(StorefrontError::validation(format!(
            "Slug must be between 1 and {} characters",
            MAX_SLUG_LENGTH
        )));
    }

    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(StorefrontError::validation(format!("Invalid slug '{}'", slug)));
    }

    Ok(())
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new active category.
    #[must_use]
    pub fn new(name: String, slug: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name,
            slug,
            description,
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates invariants before the category is persisted.
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::validation("Category name cannot be blank"));
        }
        validate_slug(&self.slug)
    }

    /// Marks the category as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new active product.
    #[must_use]
    pub fn new(
        name: String,
        slug: String,
        category_id: Option<CategoryId>,
        price_cents: i64,
        stock: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            category_id,
            name,
            slug,
            description: None,
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates invariants before the product is persisted.
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::validation("Product name cannot be blank"));
        }
        if self.price_cents < 0 {
            return Err(StorefrontError::validation("Product price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(StorefrontError::validation("Product stock cannot be negative"));
        }
        validate_slug(&self.slug)
    }

    /// Marks the product as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Aggregate of all reviews for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub product_id: ProductId,
    /// Mean rating, 0.0 when there are no reviews.
    pub average: f64,
    pub count: u64,
}

impl RatingSummary {
    /// Summary for a product with no reviews.
    #[must_use]
    pub const fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            average: 0.0,
            count: 0,
        }
    }
}
