//! Expiry Policy Module
//!
//! Resolves the TTL chosen at a set call site into an absolute deadline.

use std::time::{Duration, Instant};

// == Expiry ==
/// TTL selection for a single set call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Use the owning cache's configured default TTL
    Default,
    /// Use this TTL for this one entry; `Duration::ZERO` means never expire
    After(Duration),
}

impl Expiry {
    /// Sentinel for entries that never expire.
    pub const NEVER: Expiry = Expiry::After(Duration::ZERO);

    /// Returns the effective TTL, or None when the entry never expires.
    pub fn ttl(self, default_ttl: Duration) -> Option<Duration> {
        let ttl = match self {
            Expiry::Default => default_ttl,
            Expiry::After(ttl) => ttl,
        };
        (!ttl.is_zero()).then_some(ttl)
    }

    /// Returns the absolute deadline relative to `now`.
    ///
    /// A TTL too large to represent as an `Instant` is treated as no expiry.
    pub fn deadline(self, default_ttl: Duration, now: Instant) -> Option<Instant> {
        self.ttl(default_ttl).and_then(|ttl| now.checked_add(ttl))
    }
}

/// Returns true once `now` has reached the deadline.
///
/// Boundary condition: an entry is expired when `now >= expires_at`, so an
/// entry is never readable at the exact instant its TTL elapses.
pub fn is_past(expires_at: Option<Instant>, now: Instant) -> bool {
    match expires_at {
        Some(deadline) => now >= deadline,
        None => false,
    }
}
