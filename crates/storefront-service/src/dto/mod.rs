//! Data Transfer Objects (DTOs).
//!
//! Public response shapes. The cache stores domain entities; these are
//! derived from them at the edge.

mod catalog_dto;
mod order_dto;
mod wishlist_dto;

pub use catalog_dto::*;
pub use order_dto::*;
pub use wishlist_dto::*;
