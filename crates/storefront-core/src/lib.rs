//! # Storefront Core
//!
//! Core types, domain entities, and error definitions shared by every layer
//! of the storefront backend: typed identifiers, catalog and wishlist
//! entities, the order-number value objects, and the unified error type.

pub mod domain;
pub mod error;
pub mod id;
pub mod order_number;
pub mod result;
pub mod telemetry;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use order_number::*;
pub use result::*;
