//! Cluster transport seam.
//!
//! The cache only produces and consumes invalidation payloads. Delivery,
//! membership and retries belong to whatever implements [`ClusterTransport`].

use tokio::sync::broadcast;

use crate::error::{CacheError, Result};

/// Outbound half of a cluster messaging system.
pub trait ClusterTransport: Send + Sync {
    /// Hands a payload to the transport for delivery to every peer
    /// subscribed to `channel`.
    ///
    /// Implementations must return without waiting for delivery. Errors are
    /// logged by the caller and never retried.
    fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<()>;
}

/// A `(channel, payload)` pair as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEnvelope {
    pub channel: String,
    pub payload: Vec<u8>,
}

// == Broadcast Bus ==
/// In-process transport built on a tokio broadcast channel.
///
/// Every subscriber sees every envelope, including ones it published itself.
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<ClusterEnvelope>,
}

impl BroadcastBus {
    /// Creates a bus that buffers up to `buffer` undelivered envelopes per
    /// subscriber before the slowest one starts lagging.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClusterEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ClusterTransport for BroadcastBus {
    fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<()> {
        self.sender
            .send(ClusterEnvelope {
                channel: channel.to_string(),
                payload,
            })
            .map(|_| ())
            .map_err(|_| CacheError::Transport(format!("no subscribers on channel {channel}")))
    }
}
