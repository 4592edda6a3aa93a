//! Cache Module
//!
//! Bounded in-memory caching with LRU eviction and TTL expiration.

mod entry;
mod expiry;
mod facade;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiry::Expiry;
pub use facade::Cache;
pub use lru::LruList;
pub use stats::CacheStats;
pub use store::CacheStore;
