//! Cluster Cache - bounded in-process caching for a server fleet
//!
//! Provides typed LRU caches with TTL expiration whose explicit removals and
//! purges are propagated to peer nodes as invalidation messages.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheStats, Expiry};
pub use cluster::{spawn_invalidation_listener, BroadcastBus, ClusterTransport};
pub use codec::{DynamicValue, JsonCodec, ValueCodec};
pub use config::{CacheConfig, ServerConfig};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
