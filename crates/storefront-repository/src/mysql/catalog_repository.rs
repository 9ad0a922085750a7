//! MySQL category and product repositories.

use super::parse_uuid;
use crate::traits::{CategoryRepository, ProductRepository};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use storefront_core::{Category, CategoryId, Product, ProductId, StorefrontError, StorefrontResult};
use tracing::debug;

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, image_url, is_active, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price_cents, stock, \
     is_active, created_at, updated_at";

/// Database row representation of a category.
#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = StorefrontError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::from_uuid(parse_uuid(&row.id)?),
            name: row.name,
            slug: row.slug,
            description: row.description,
            image_url: row.image_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row representation of a product.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    category_id: Option<String>,
    name: String,
    slug: String,
    description: Option<String>,
    price_cents: i64,
    stock: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StorefrontError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category_id = row
            .category_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(CategoryId::from_uuid);

        Ok(Product {
            id: ProductId::from_uuid(parse_uuid(&row.id)?),
            category_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn collect_rows<R, T>(rows: Vec<R>) -> StorefrontResult<Vec<T>>
where
    T: TryFrom<R, Error = StorefrontError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// MySQL category repository implementation.
#[derive(Clone)]
pub struct MySqlCategoryRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlCategoryRepository {
    /// Creates a new MySQL category repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for MySqlCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> StorefrontResult<Option<Category>> {
        debug!("Finding category by id: {}", id);

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE id = ?",
            CATEGORY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Category>> {
        debug!("Finding category by slug: {}", slug);

        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE slug = ?",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn find_all(&self) -> StorefrontResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories ORDER BY name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(self.pool.inner())
        .await?;

        collect_rows(rows)
    }

    async fn save(&self, category: &Category) -> StorefrontResult<Category> {
        debug!("Saving category: {}", category.slug);

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description, image_url, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> StorefrontResult<Category> {
        debug!("Updating category: {}", category.id);

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, slug = ?, description = ?, image_url = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(category.is_active)
        .bind(category.updated_at)
        .bind(category.id.to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 && self.find_by_id(category.id).await?.is_none() {
            return Err(StorefrontError::not_found("Category", category.id));
        }

        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> StorefrontResult<bool> {
        debug!("Deleting category: {}", id);

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlCategoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlCategoryRepository").finish_non_exhaustive()
    }
}

/// MySQL product repository implementation.
#[derive(Clone)]
pub struct MySqlProductRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlProductRepository {
    /// Creates a new MySQL product repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn find_by_id(&self, id: ProductId) -> StorefrontResult<Option<Product>> {
        debug!("Finding product by id: {}", id);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> StorefrontResult<Option<Product>> {
        debug!("Finding product by slug: {}", slug);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE slug = ?",
            PRODUCT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn find_all(&self) -> StorefrontResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(self.pool.inner())
        .await?;

        collect_rows(rows)
    }

    async fn find_by_category(&self, category_id: CategoryId) -> StorefrontResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE category_id = ? ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(category_id.to_string())
        .fetch_all(self.pool.inner())
        .await?;

        collect_rows(rows)
    }

    async fn save(&self, product: &Product) -> StorefrontResult<Product> {
        debug!("Saving product: {}", product.slug);

        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, slug, description, price_cents, stock,
                                  is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id.to_string())
        .bind(product.category_id.map(|id| id.to_string()))
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> StorefrontResult<Product> {
        debug!("Updating product: {}", product.id);

        let result = sqlx::query(
            r#"
            UPDATE products
            SET category_id = ?, name = ?, slug = ?, description = ?, price_cents = ?, stock = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(product.category_id.map(|id| id.to_string()))
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.updated_at)
        .bind(product.id.to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 && self.find_by_id(product.id).await?.is_none() {
            return Err(StorefrontError::not_found("Product", product.id));
        }

        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> StorefrontResult<bool> {
        debug!("Deleting product: {}", id);

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlProductRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlProductRepository").finish_non_exhaustive()
    }
}
