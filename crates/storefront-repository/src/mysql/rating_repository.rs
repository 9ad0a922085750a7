//! MySQL rating aggregate reader.

use crate::traits::RatingRepository;
use crate::DatabasePool;
use async_trait::async_trait;
use sqlx::FromRow;
use std::sync::Arc;
use storefront_core::{ProductId, RatingSummary, StorefrontResult};

#[derive(Debug, FromRow)]
struct SummaryRow {
    review_count: i64,
    average: f64,
}

/// Computes rating summaries from the `product_reviews` table.
#[derive(Clone)]
pub struct MySqlRatingRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlRatingRepository {
    /// Creates a new MySQL rating repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for MySqlRatingRepository {
    async fn summary(&self, product_id: ProductId) -> StorefrontResult<RatingSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT COUNT(*) AS review_count,
                   CAST(COALESCE(AVG(rating), 0) AS DOUBLE) AS average
            FROM product_reviews
            WHERE product_id = ?
            "#,
        )
        .bind(product_id.to_string())
        .fetch_one(self.pool.inner())
        .await?;

        Ok(RatingSummary {
            product_id,
            average: row.average,
            count: u64::try_from(row.review_count).unwrap_or(0),
        })
    }
}

impl std::fmt::Debug for MySqlRatingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlRatingRepository").finish_non_exhaustive()
    }
}
