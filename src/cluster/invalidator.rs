//! Cluster invalidation adapter.
//!
//! Turns local Remove/Purge calls into published messages and filters
//! inbound payloads down to the ops this node still has to apply.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cluster::{ClusterTransport, InvalidationMessage, InvalidationOp};

/// Default number of peers whose progress is remembered.
pub const DEFAULT_ORIGIN_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct PeerProgress {
    sequence: u64,
    /// Ledger tick of the last accepted message
    seen_at: u64,
}

#[derive(Debug, Default)]
struct PeerLedger {
    peers: HashMap<Uuid, PeerProgress>,
    tick: u64,
}

impl PeerLedger {
    /// Forgets the peer heard from least recently.
    fn forget_stalest(&mut self) {
        let stalest = self
            .peers
            .iter()
            .min_by_key(|(_, progress)| progress.seen_at)
            .map(|(origin, _)| *origin);
        if let Some(origin) = stalest {
            self.peers.remove(&origin);
            debug!(origin = %origin, "Forgot stalest invalidation origin");
        }
    }
}

/// Producer/consumer pair for one cache instance's invalidation channel.
pub struct ClusterInvalidator {
    channel: String,
    node_id: Uuid,
    /// Last sequence published. Held across `publish` so messages reach the
    /// transport in sequence order.
    sequence: Mutex<u64>,
    transport: Arc<dyn ClusterTransport>,
    /// Highest sequence applied per peer
    last_applied: Mutex<PeerLedger>,
    origin_limit: usize,
}

impl ClusterInvalidator {
    pub fn new(channel: impl Into<String>, transport: Arc<dyn ClusterTransport>) -> Self {
        Self {
            channel: channel.into(),
            node_id: Uuid::new_v4(),
            sequence: Mutex::new(0),
            transport,
            last_applied: Mutex::new(PeerLedger::default()),
            origin_limit: DEFAULT_ORIGIN_LIMIT,
        }
    }

    /// Caps how many peers are tracked for duplicate suppression. When full,
    /// the peer heard from least recently is forgotten.
    pub fn with_origin_limit(mut self, limit: usize) -> Self {
        self.origin_limit = limit.max(1);
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Identifier stamped on every message this node publishes.
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    // == Outbound ==
    /// Publishes `op` to peers. Failures are logged and swallowed.
    ///
    /// The sequence lock is held until the transport returns, so concurrent
    /// callers publish in sequence order.
    pub fn broadcast(&self, op: InvalidationOp) {
        let mut last_sequence = self.sequence.lock();
        *last_sequence += 1;
        let sequence = *last_sequence;
        let message = InvalidationMessage::new(self.channel.clone(), self.node_id, sequence, op);

        let payload = match message.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "Failed to encode invalidation");
                return;
            }
        };

        match self.transport.publish(&self.channel, payload) {
            Ok(()) => debug!(channel = %self.channel, sequence, op = ?message.op, "Published invalidation"),
            Err(e) => warn!(channel = %self.channel, sequence, error = %e, "Invalidation publish failed"),
        }
    }

    // == Inbound ==
    /// Returns the op carried by `payload` if this node should apply it.
    ///
    /// Skips other channels, this node's own messages, undecodable payloads,
    /// and sequences already applied from the same peer. Per-peer ordering is
    /// assumed to be FIFO, which `broadcast` guarantees on the sending side.
    pub fn accept(&self, channel: &str, payload: &[u8]) -> Option<InvalidationOp> {
        if channel != self.channel {
            return None;
        }

        let message = match InvalidationMessage::from_payload(payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Dropping undecodable invalidation");
                return None;
            }
        };

        if message.channel != self.channel || message.origin == self.node_id {
            return None;
        }

        let mut ledger = self.last_applied.lock();
        let previous = ledger.peers.get(&message.origin).map(|progress| progress.sequence);
        match previous {
            Some(seen) if message.sequence <= seen => {
                debug!(origin = %message.origin, sequence = message.sequence, "Skipping duplicate invalidation");
                return None;
            }
            Some(_) => {}
            None => {
                if ledger.peers.len() >= self.origin_limit {
                    ledger.forget_stalest();
                }
            }
        }
        ledger.tick += 1;
        let seen_at = ledger.tick;
        ledger.peers.insert(
            message.origin,
            PeerProgress {
                sequence: message.sequence,
                seen_at,
            },
        );

        Some(message.op)
    }

    /// Number of peers currently tracked for duplicate suppression.
    pub fn tracked_origins(&self) -> usize {
        self.last_applied.lock().peers.len()
    }
}

impl fmt::Debug for ClusterInvalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterInvalidator")
            .field("channel", &self.channel)
            .field("node_id", &self.node_id)
            .field("sequence", &*self.sequence.lock())
            .field("origin_limit", &self.origin_limit)
            .finish()
    }
}
