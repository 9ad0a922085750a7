//! MySQL wishlist repository for authenticated owners.

use super::parse_uuid;
use crate::traits::WishlistRepository;
use crate::DatabasePool;
use async_trait::async_trait;
use sqlx::{MySql, QueryBuilder};
use std::sync::Arc;
use storefront_core::{ProductId, StorefrontResult, UserId, WishlistSet};
use tracing::debug;

/// MySQL wishlist repository over the `wishlist_items` table.
#[derive(Clone)]
pub struct MySqlWishlistRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlWishlistRepository {
    /// Creates a new MySQL wishlist repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistRepository for MySqlWishlistRepository {
    async fn list(&self, user_id: UserId) -> StorefrontResult<WishlistSet> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT product_id FROM wishlist_items WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool.inner())
        .await?;

        ids.iter()
            .map(|id| parse_uuid(id).map(ProductId::from_uuid))
            .collect()
    }

    async fn add(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool> {
        debug!("Adding product {} to wishlist of user {}", product_id, user_id);

        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO wishlist_items (user_id, product_id, created_at)
            VALUES (?, ?, CURRENT_TIMESTAMP(3))
            "#,
        )
        .bind(user_id.to_string())
        .bind(product_id.to_string())
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_all(&self, user_id: UserId, items: &WishlistSet) -> StorefrontResult<u64> {
        if items.is_empty() {
            return Ok(0);
        }

        let user = user_id.to_string();
        let mut builder: QueryBuilder<'_, MySql> =
            QueryBuilder::new("INSERT IGNORE INTO wishlist_items (user_id, product_id, created_at) ");
        builder.push_values(items.iter(), |mut row, product_id| {
            row.push_bind(user.clone())
                .push_bind(product_id.to_string())
                .push("CURRENT_TIMESTAMP(3)");
        });

        let result = builder.build().execute(self.pool.inner()).await?;
        debug!(
            "Persisted {} of {} wishlist items for user {}",
            result.rows_affected(),
            items.len(),
            user_id
        );

        Ok(result.rows_affected())
    }

    async fn remove(&self, user_id: UserId, product_id: ProductId) -> StorefrontResult<bool> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id.to_string())
            .bind(product_id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: UserId) -> StorefrontResult<u64> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }
}

impl std::fmt::Debug for MySqlWishlistRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlWishlistRepository").finish_non_exhaustive()
    }
}
