//! # Storefront Repository
//!
//! Durable storage for the storefront core:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn SequenceStore / CategoryRepository / ...>  (traits.rs)
//! MySql*                                                   (mysql/)
//!   ↓
//! MySQL
//! ```
//!
//! The sequence store is deliberately independent of the cache: it is only
//! ever backed by the database.

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
