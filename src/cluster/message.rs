//! Invalidation wire messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CacheError, Result};

/// What a peer should drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidationOp {
    /// Drop a single key
    RemoveKey { key: String },
    /// Drop every entry
    PurgeAll,
}

/// Payload published on an invalidation channel.
///
/// `origin` and `sequence` let receivers skip their own echoes and
/// duplicate deliveries. Applying the same op twice is harmless either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationMessage {
    pub channel: String,
    pub origin: Uuid,
    pub sequence: u64,
    pub issued_at: DateTime<Utc>,
    pub op: InvalidationOp,
}

impl InvalidationMessage {
    pub fn new(channel: impl Into<String>, origin: Uuid, sequence: u64, op: InvalidationOp) -> Self {
        Self {
            channel: channel.into(),
            origin,
            sequence,
            issued_at: Utc::now(),
            op,
        }
    }

    /// Encodes the message for the transport.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CacheError::Encode(e.to_string()))
    }

    /// Parses a payload received from the transport.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
