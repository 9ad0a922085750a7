//! Caching infrastructure for the service layer.
//!
//! [`CacheInterface`] is the fallible backend seam with a Redis and an
//! in-memory implementation. Services talk to [`CacheStore`], which turns
//! every backend failure into a miss or a logged no-op.

mod cache_interface;
pub mod cache_keys;
pub mod global;
mod memory_cache;
mod redis_cache;
mod store;

pub use cache_interface::CacheInterface;
pub use cache_keys::{CacheKeys, DEFAULT_CACHE_PREFIX};
pub use memory_cache::InMemoryCacheService;
pub use redis_cache::RedisCacheService;
pub use store::CacheStore;
