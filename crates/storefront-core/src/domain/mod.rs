//! Domain entities and value objects for the storefront.

pub mod catalog;
pub mod wishlist;

pub use catalog::*;
pub use wishlist::*;
