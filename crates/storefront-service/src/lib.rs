//! # Storefront Service
//!
//! Order sequencing, catalog caching, and wishlist services for the
//! storefront backend. Every service reads and writes through the shared
//! [`CacheStore`] and keeps MySQL as the source of truth.

pub mod cache;
pub mod catalog_cache;
pub mod context;
pub mod dto;
pub mod reconciliation;
pub mod sequence_service;
pub mod wishlist_cache;

#[cfg(test)]
mod test_support;

pub use cache::*;
pub use catalog_cache::CatalogCache;
pub use context::StorefrontContext;
pub use dto::*;
pub use reconciliation::ReconciliationService;
pub use sequence_service::*;
pub use wishlist_cache::WishlistCache;
