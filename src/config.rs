//! Configuration Module
//!
//! Cache instance configuration plus the settings of the diagnostics binary,
//! loadable from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Configuration of a single cache instance.
///
/// Every instance carries its own copy, so independently configured caches
/// can live side by side in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// TTL applied by `Cache::set`; zero means entries do not expire
    pub default_expiry: Duration,
    /// Cluster event identifier; empty disables cluster invalidation
    pub invalidation_channel: String,
}

impl CacheConfig {
    /// Creates a config with the given capacity, no default expiry and
    /// cluster invalidation disabled.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            default_expiry: Duration::ZERO,
            invalidation_channel: String::new(),
        }
    }

    pub fn with_default_expiry(mut self, default_expiry: Duration) -> Self {
        self.default_expiry = default_expiry;
        self
    }

    pub fn with_invalidation_channel(mut self, channel: impl Into<String>) -> Self {
        self.invalidation_channel = channel.into();
        self
    }

    /// Returns true when mutations are broadcast to peers.
    pub fn invalidation_enabled(&self) -> bool {
        !self.invalidation_channel.is_empty()
    }

    /// Rejects configurations a cache cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum live entries (default: 1000)
    /// - `CACHE_DEFAULT_EXPIRY_SECS` - Default TTL in seconds, 0 = none (default: 0)
    /// - `CACHE_INVALIDATION_CHANNEL` - Cluster channel, empty = disabled (default: "")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_parse("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            default_expiry: env_parse("CACHE_DEFAULT_EXPIRY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_expiry),
            invalidation_channel: env::var("CACHE_INVALIDATION_CHANNEL")
                .unwrap_or(defaults.invalidation_channel),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Settings for the diagnostics server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Cache served by this node
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub sweep_interval: u64,
}

impl ServerConfig {
    /// Loads the server settings and the embedded cache config.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
            sweep_interval: env_parse("SWEEP_INTERVAL").unwrap_or(1),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            sweep_interval: 1,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
