//! Cluster Module
//!
//! Keeps per-node caches coherent by exchanging invalidation messages.
//! Nothing here reads a peer's cache: nodes only tell each other which keys
//! to drop.
//!
//! - Outbound: explicit Remove and Purge publish `RemoveKey` / `PurgeAll`.
//!   Capacity eviction, TTL expiry and Set stay local.
//! - Inbound: accepted ops go through the local remove/purge path and are
//!   never published again.

mod invalidator;
mod listener;
mod message;
mod transport;

pub use invalidator::ClusterInvalidator;
pub use listener::spawn_invalidation_listener;
pub use message::{InvalidationMessage, InvalidationOp};
pub use transport::{BroadcastBus, ClusterEnvelope, ClusterTransport};
