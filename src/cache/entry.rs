//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::expiry::{self, Expiry};
use crate::codec::Encoded;

// == Cache Entry ==
/// Represents a single cache entry with its encoded value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored representation
    pub value: Encoded,
    /// Creation instant
    pub created_at: Instant,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The encoded value to store
    /// * `expiry` - TTL selection for this entry
    /// * `default_ttl` - The owning cache's default TTL
    pub fn new(value: Encoded, expiry: Expiry, default_ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: expiry.deadline(default_ttl, now),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied clock reading, so a batch of
    /// entries can be judged against one instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        expiry::is_past(self.expires_at, now)
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
