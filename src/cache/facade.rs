//! Cache Facade Module
//!
//! Thread-safe entry point tying the LRU store, the value codec and the
//! cluster invalidator together.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{CacheStats, CacheStore, Expiry};
use crate::cluster::{ClusterInvalidator, ClusterTransport, InvalidationOp};
use crate::codec::{JsonCodec, ValueCodec};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

struct CacheInner<C> {
    config: CacheConfig,
    store: Mutex<CacheStore>,
    codec: C,
    invalidator: Option<ClusterInvalidator>,
}

// == Cache ==
/// Shared handle to one cache instance.
///
/// Cloning is cheap and every clone operates on the same entries. All
/// mutations, including the promotion done by `get`, take the same lock, so
/// callers never see a half-updated recency list. Values are encoded before
/// and decoded after the lock is held.
pub struct Cache<C: ValueCodec = JsonCodec> {
    inner: Arc<CacheInner<C>>,
}

impl<C: ValueCodec> Clone for Cache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Cache<JsonCodec> {
    /// Creates a cache without cluster invalidation.
    ///
    /// Fails if the config names an invalidation channel, since there is no
    /// transport to publish on; use [`Cache::with_transport`] for that.
    pub fn new(config: CacheConfig) -> Result<Self> {
        if config.invalidation_enabled() {
            return Err(CacheError::InvalidConfig(format!(
                "invalidation channel '{}' configured without a cluster transport",
                config.invalidation_channel
            )));
        }
        Self::with_codec(config, JsonCodec, None)
    }

    /// Creates a cache publishing invalidations on `transport`.
    ///
    /// Invalidation stays disabled when the config's channel is empty.
    pub fn with_transport(config: CacheConfig, transport: Arc<dyn ClusterTransport>) -> Result<Self> {
        Self::with_codec(config, JsonCodec, Some(transport))
    }
}

impl<C: ValueCodec> Cache<C> {
    /// Creates a cache with an explicit codec and optional transport.
    pub fn with_codec(
        config: CacheConfig,
        codec: C,
        transport: Option<Arc<dyn ClusterTransport>>,
    ) -> Result<Self> {
        config.validate()?;

        let invalidator = match transport {
            Some(transport) if config.invalidation_enabled() => Some(ClusterInvalidator::new(
                config.invalidation_channel.clone(),
                transport,
            )),
            _ => None,
        };

        info!(
            capacity = config.capacity,
            default_expiry_ms = config.default_expiry.as_millis() as u64,
            channel = %config.invalidation_channel,
            invalidation = invalidator.is_some(),
            "Cache created"
        );

        Ok(Self {
            inner: Arc::new(CacheInner {
                store: Mutex::new(CacheStore::new(config.capacity, config.default_expiry)),
                config,
                codec,
                invalidator,
            }),
        })
    }

    // == Set ==
    /// Stores `value` under `key` using the configured default TTL.
    pub fn set<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        self.set_with(key, value, Expiry::Default)
    }

    /// Same as [`Cache::set`]; names the default-TTL call site explicitly.
    pub fn set_with_default_expiry<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        self.set_with(key, value, Expiry::Default)
    }

    /// Stores `value` with its own TTL. `Duration::ZERO` means never expire.
    pub fn set_with_expiry<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        self.set_with(key, value, Expiry::After(ttl))
    }

    /// Stores `value` under `key` with the given expiry selection.
    ///
    /// On encode failure the cache is left unmodified.
    pub fn set_with<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
        expiry: Expiry,
    ) -> Result<()> {
        let encoded = self.inner.codec.encode(value)?;
        self.inner.store.lock().set(key.into(), encoded, expiry);
        Ok(())
    }

    // == Get ==
    /// Reads `key` and decodes it as `T`.
    ///
    /// The entry is promoted before decoding, so a decode failure leaves it
    /// in place and most recently used.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let encoded = self.inner.store.lock().get(key)?;
        self.inner.codec.decode(&encoded)
    }

    /// Reads `key` into `destination`. On any error the destination is
    /// left untouched.
    pub fn get_into<T: DeserializeOwned>(&self, key: &str, destination: &mut T) -> Result<()> {
        let encoded = self.inner.store.lock().get(key)?;
        self.inner.codec.decode_into(&encoded, destination)
    }

    /// Returns true if `key` is live. Does not promote.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.store.lock().contains(key)
    }

    // == Remove ==
    /// Removes `key` locally and tells peers to do the same.
    ///
    /// Absent keys are not an error and are still broadcast, since peers may
    /// hold them. Returns whether the key was present locally.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.inner.store.lock().remove(key);
        if let Some(invalidator) = &self.inner.invalidator {
            invalidator.broadcast(InvalidationOp::RemoveKey {
                key: key.to_string(),
            });
        }
        removed
    }

    // == Purge ==
    /// Removes every entry locally and tells peers to do the same.
    pub fn purge(&self) {
        self.purge_local();
        if let Some(invalidator) = &self.inner.invalidator {
            invalidator.broadcast(InvalidationOp::PurgeAll);
        }
    }

    /// Removes every entry without notifying peers.
    pub(crate) fn purge_local(&self) {
        self.inner.store.lock().purge();
    }

    // == Inspection ==
    /// Live keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.store.lock().keys()
    }

    /// Number of live entries; equal to `keys().len()` for the same state.
    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry now. Returns how many were removed.
    ///
    /// Expiry is local bookkeeping and is never broadcast.
    pub fn purge_expired(&self) -> usize {
        self.inner.store.lock().cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.store.lock().stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// True when mutations are published to peers.
    pub fn invalidation_enabled(&self) -> bool {
        self.inner.invalidator.is_some()
    }

    /// Node identity used on published invalidations, when enabled.
    pub fn node_id(&self) -> Option<Uuid> {
        self.inner.invalidator.as_ref().map(ClusterInvalidator::node_id)
    }

    // == Cluster Inbound ==
    /// Applies an inbound `(channel, payload)` pair from the transport.
    ///
    /// Returns true if an invalidation was applied. Never publishes.
    pub fn handle_cluster_message(&self, channel: &str, payload: &[u8]) -> bool {
        let Some(invalidator) = &self.inner.invalidator else {
            return false;
        };
        let Some(op) = invalidator.accept(channel, payload) else {
            return false;
        };

        match &op {
            InvalidationOp::RemoveKey { key } => {
                self.inner.store.lock().remove(key);
            }
            InvalidationOp::PurgeAll => self.purge_local(),
        }
        debug!(channel = %channel, op = ?op, "Applied peer invalidation");
        true
    }
}

impl<C: ValueCodec> fmt::Debug for Cache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.inner.config)
            .field("invalidator", &self.inner.invalidator)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::InvalidationMessage;
    use std::collections::HashMap;
    use std::thread;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<InvalidationMessage>>,
    }

    impl ClusterTransport for RecordingTransport {
        fn publish(&self, _channel: &str, payload: Vec<u8>) -> Result<()> {
            let message = InvalidationMessage::from_payload(&payload)?;
            self.sent.lock().push(message);
            Ok(())
        }
    }

    struct FailingTransport;

    impl ClusterTransport for FailingTransport {
        fn publish(&self, _channel: &str, _payload: Vec<u8>) -> Result<()> {
            Err(CacheError::Transport("unreachable".to_string()))
        }
    }

    fn local(capacity: usize) -> Cache {
        Cache::new(CacheConfig::new(capacity)).unwrap()
    }

    fn clustered(transport: Arc<dyn ClusterTransport>) -> Cache {
        let config = CacheConfig::new(16).with_invalidation_channel("inv");
        Cache::with_transport(config, transport).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            Cache::new(CacheConfig::new(0)),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_channel_without_transport_rejected() {
        let config = CacheConfig::new(4).with_invalidation_channel("inv");
        assert!(matches!(Cache::new(config), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_channel_disables_invalidation() {
        let transport = Arc::new(RecordingTransport::default());
        let cache = Cache::with_transport(CacheConfig::new(4), transport.clone()).unwrap();

        cache.remove("a");
        cache.purge();

        assert!(!cache.invalidation_enabled());
        assert!(cache.node_id().is_none());
        assert!(transport.sent.lock().is_empty());
    }

    #[test]
    fn test_set_and_get_typed() {
        let cache = local(8);
        cache.set("n", &42i32).unwrap();
        assert_eq!(cache.get::<i32>("n").unwrap(), 42);
    }

    #[test]
    fn test_get_into_destination() {
        let cache = local(8);
        let mut value: HashMap<String, Vec<u32>> = HashMap::new();
        value.insert("a".to_string(), vec![1, 2]);
        cache.set("m", &value).unwrap();

        let mut destination = HashMap::new();
        cache.get_into("m", &mut destination).unwrap();
        assert_eq!(destination, value);
    }

    #[test]
    fn test_encode_failure_leaves_cache_unmodified() {
        let cache = local(8);
        cache.set("k", "original").unwrap();

        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        assert!(matches!(cache.set("k", &bad), Err(CacheError::Encode(_))));
        assert!(matches!(cache.set("other", &bad), Err(CacheError::Encode(_))));

        assert_eq!(cache.get::<String>("k").unwrap(), "original");
        assert_eq!(cache.keys(), vec!["k"]);
    }

    #[test]
    fn test_decode_failure_keeps_entry_and_promotes() {
        let cache = local(2);
        cache.set("a", "text").unwrap();
        cache.set("b", "other").unwrap();

        assert!(matches!(cache.get::<u64>("a"), Err(CacheError::Decode(_))));

        assert_eq!(cache.keys(), vec!["b", "a"]);
        assert_eq!(cache.get::<String>("a").unwrap(), "text");
    }

    #[test]
    fn test_explicit_ttl_expires() {
        let cache = local(8);
        cache
            .set_with_expiry("short", &1, Duration::from_millis(50))
            .unwrap();
        thread::sleep(Duration::from_millis(80));

        assert!(cache.get::<i32>("short").unwrap_err().is_not_found());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_purge_expired() {
        let cache = local(8);
        cache
            .set_with_expiry("short", &1, Duration::from_millis(50))
            .unwrap();
        cache.set("forever", &2).unwrap();
        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.keys(), vec!["forever"]);
    }

    #[test]
    fn test_len_ignores_expired_entries() {
        let cache = local(8);
        cache
            .set_with_expiry("short", &1, Duration::from_millis(50))
            .unwrap();
        cache.set("forever", &2).unwrap();
        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.len(), cache.keys().len());
        assert!(!cache.contains("short"));
    }

    #[test]
    fn test_remove_and_purge_broadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let cache = clustered(transport.clone());
        cache.set("a", &1).unwrap();

        assert!(cache.remove("a"));
        assert!(!cache.remove("missing"));
        cache.purge();

        let sent = transport.sent.lock();
        let ops: Vec<_> = sent.iter().map(|m| m.op.clone()).collect();
        assert_eq!(
            ops,
            vec![
                InvalidationOp::RemoveKey { key: "a".to_string() },
                InvalidationOp::RemoveKey { key: "missing".to_string() },
                InvalidationOp::PurgeAll,
            ]
        );
        assert!(sent.iter().all(|m| Some(m.origin) == cache.node_id()));
    }

    #[test]
    fn test_set_eviction_and_expiry_do_not_broadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let config = CacheConfig::new(1).with_invalidation_channel("inv");
        let cache = Cache::with_transport(config, transport.clone()).unwrap();

        cache.set("a", &1).unwrap();
        cache.set("b", &2).unwrap();
        cache
            .set_with_expiry("c", &3, Duration::from_millis(1))
            .unwrap();
        thread::sleep(Duration::from_millis(10));
        let _ = cache.get::<i32>("c");
        cache.purge_expired();

        assert!(transport.sent.lock().is_empty());
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_publish_failure_does_not_fail_mutation() {
        let cache = clustered(Arc::new(FailingTransport));
        cache.set("a", &1).unwrap();

        assert!(cache.remove("a"));
        cache.purge();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inbound_applies_without_rebroadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let cache = clustered(transport.clone());
        cache.set("a", &1).unwrap();
        cache.set("b", &2).unwrap();

        let peer = Uuid::new_v4();
        let remove = InvalidationMessage::new(
            "inv",
            peer,
            1,
            InvalidationOp::RemoveKey { key: "a".to_string() },
        );
        assert!(cache.handle_cluster_message("inv", &remove.to_payload().unwrap()));
        assert_eq!(cache.keys(), vec!["b"]);

        let purge = InvalidationMessage::new("inv", peer, 2, InvalidationOp::PurgeAll);
        assert!(cache.handle_cluster_message("inv", &purge.to_payload().unwrap()));
        assert!(cache.is_empty());

        assert!(transport.sent.lock().is_empty());
    }

    #[test]
    fn test_inbound_ignored_when_disabled() {
        let cache = local(4);
        cache.set("a", &1).unwrap();
        let message = InvalidationMessage::new("inv", Uuid::new_v4(), 1, InvalidationOp::PurgeAll);

        assert!(!cache.handle_cluster_message("inv", &message.to_payload().unwrap()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_callers_respect_capacity() {
        let cache = local(64);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("{}-{}", t, i % 100);
                        cache.set(key.clone(), &i).unwrap();
                        let _ = cache.get::<i32>(&key);
                        if i % 7 == 0 {
                            cache.remove(&key);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let keys = cache.keys();
        assert!(keys.len() <= 64);
        assert_eq!(keys.len(), cache.len());
        for key in keys {
            assert!(cache.get::<i32>(&key).is_ok());
        }
    }
}
