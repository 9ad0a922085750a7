//! MySQL order sequence store.
//!
//! The atomic path calls the `next_order_sequence` stored procedure, which
//! performs an insert-or-increment in one statement and returns the new value
//! through `LAST_INSERT_ID(expr)`. The conditional statements below back the
//! optimistic fallback used when that procedure is not installed.

use crate::traits::SequenceStore;
use crate::DatabasePool;
use async_trait::async_trait;
use sqlx::mysql::MySqlDatabaseError;
use std::sync::Arc;
use storefront_core::{DateKey, StorefrontResult};
use tracing::{debug, warn};

/// `ER_SP_DOES_NOT_EXIST`
const MYSQL_PROCEDURE_MISSING: u16 = 1305;

/// MySQL-backed sequence store over the `order_sequences` table.
#[derive(Clone)]
pub struct MySqlSequenceStore {
    pool: Arc<DatabasePool>,
}

impl MySqlSequenceStore {
    /// Creates a new MySQL sequence store.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

fn is_missing_procedure(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| e.number() == MYSQL_PROCEDURE_MISSING),
        _ => false,
    }
}

#[async_trait]
impl SequenceStore for MySqlSequenceStore {
    async fn atomic_increment(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>> {
        let result = sqlx::query_scalar::<_, u64>("CALL next_order_sequence(?)")
            .bind(date_key.as_str())
            .fetch_one(self.pool.inner())
            .await;

        match result {
            Ok(counter) => {
                debug!("Sequence {} advanced atomically to {}", date_key, counter);
                Ok(Some(counter))
            }
            Err(e) if is_missing_procedure(&e) => {
                warn!("next_order_sequence procedure is missing; using optimistic fallback");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, date_key: &DateKey) -> StorefrontResult<Option<u64>> {
        let counter = sqlx::query_scalar::<_, u64>(
            "SELECT counter FROM order_sequences WHERE date_key = ?",
        )
        .bind(date_key.as_str())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(counter)
    }

    async fn insert_if_absent(&self, date_key: &DateKey, counter: u64) -> StorefrontResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO order_sequences (date_key, counter, last_updated)
            VALUES (?, ?, CURRENT_TIMESTAMP(3))
            "#,
        )
        .bind(date_key.as_str())
        .bind(counter)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn compare_and_swap(&self, date_key: &DateKey, expected: u64, new: u64) -> StorefrontResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE order_sequences
            SET counter = ?, last_updated = CURRENT_TIMESTAMP(3)
            WHERE date_key = ? AND counter = ?
            "#,
        )
        .bind(new)
        .bind(date_key.as_str())
        .bind(expected)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl std::fmt::Debug for MySqlSequenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSequenceStore").finish_non_exhaustive()
    }
}
