//! Cache Store Module
//!
//! LRU store combining the recency list with TTL expiration. `CacheStore` is
//! a single-writer structure; the `Cache` facade serializes access to it.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Expiry, LruList};
use crate::codec::Encoded;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded LRU storage with lazy TTL expiry.
#[derive(Debug)]
pub struct CacheStore {
    /// Entries in recency order
    entries: LruList<CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL applied for `Expiry::Default`; zero means no expiry
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// Capacity must be positive; `CacheConfig::validate` rejects zero.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        debug_assert!(capacity > 0, "CacheStore capacity must be positive");
        Self {
            entries: LruList::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores an encoded value, replacing any existing entry for `key`.
    ///
    /// The entry becomes most recently used. Inserting a new key into a full
    /// store evicts the least recently used entry first.
    pub fn set(&mut self, key: String, value: Encoded, expiry: Expiry) {
        if !self.entries.contains(&key) && self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.pop_oldest() {
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted least recently used entry");
            }
        }

        let entry = CacheEntry::new(value, expiry, self.default_ttl);
        self.entries.push(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the encoded value for `key` and promotes it.
    ///
    /// Expired entries are removed and reported as `KeyNotFound`.
    pub fn get(&mut self, key: &str) -> Result<Encoded> {
        let expired = match self.entries.peek(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return Err(CacheError::KeyNotFound(key.to_string()));
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_miss();
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            debug!(key = %key, "Dropped expired entry on access");
            return Err(CacheError::KeyNotFound(key.to_string()));
        }

        self.entries.touch(key);
        self.stats.record_hit();
        self.entries
            .peek(key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Purge ==
    /// Removes every entry.
    pub fn purge(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Keys ==
    /// Returns live keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.to_string())
            .collect()
    }

    // == Length ==
    /// Returns the number of live entries.
    ///
    /// Expired entries still held are not counted, so this always matches
    /// `keys().len()` for the same state. Nothing is removed.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `key` is live, without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
