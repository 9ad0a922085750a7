//! MySQL implementations of the repository traits.

mod catalog_repository;
mod rating_repository;
mod sequence_store;
mod wishlist_repository;

pub use catalog_repository::{MySqlCategoryRepository, MySqlProductRepository};
pub use rating_repository::MySqlRatingRepository;
pub use sequence_store::MySqlSequenceStore;
pub use wishlist_repository::MySqlWishlistRepository;

use storefront_core::{StorefrontError, StorefrontResult};
use uuid::Uuid;

/// Parses a UUID stored as `CHAR(36)`.
pub(crate) fn parse_uuid(value: &str) -> StorefrontResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StorefrontError::Internal(format!("Invalid UUID in database: {}", e)))
}
