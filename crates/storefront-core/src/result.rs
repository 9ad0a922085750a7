//! Result type aliases for the storefront.

use crate::StorefrontError;

/// A specialized `Result` type for storefront operations.
pub type StorefrontResult<T> = Result<T, StorefrontError>;
