use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{Category, CategoryId, Product, ProductId, RatingSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            image_url: category.image_url,
            is_active: category.is_active,
            updated_at: category.updated_at,
        }
    }
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self::from(category.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub in_stock: bool,
    pub is_active: bool,
    pub rating: Option<RatingResponse>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    /// Attaches the product's rating aggregate.
    #[must_use]
    pub fn with_rating(mut self, summary: RatingSummary) -> Self {
        self.rating = Some(RatingResponse::from(summary));
        self
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price_cents: product.price_cents,
            in_stock: product.stock > 0,
            is_active: product.is_active,
            rating: None,
            updated_at: product.updated_at,
        }
    }
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self::from(product.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub average: f64,
    pub review_count: u64,
}

impl From<RatingSummary> for RatingResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            // One decimal place for display.
            average: (summary.average * 10.0).round() / 10.0,
            review_count: summary.count,
        }
    }
}
