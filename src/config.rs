//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::EvictionPolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// The same value is handed to the cache store, the cleanup sweeper and the
/// stats reporter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Memory ceiling for the cache, in megabytes
    pub max_memory_mb: u64,
    /// Default TTL in seconds for entries without explicit TTL (0 = never expire)
    pub default_ttl: u64,
    /// Eviction policy applied when the memory ceiling is reached
    pub eviction_policy: EvictionPolicy,
    /// Background cleanup interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_MEMORY_MB` - Memory ceiling in megabytes (default: 100)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables (default: 3600)
    /// - `EVICTION_POLICY` - One of `none`, `lru`, `lfu`, `fifo` (default: lru)
    /// - `CLEANUP_INTERVAL_MS` - Cleanup frequency in milliseconds (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let eviction_policy = match env::var("EVICTION_POLICY") {
            Ok(raw) => EvictionPolicy::from_str(&raw).unwrap_or_else(|err| {
                warn!("{}, falling back to {}", err, defaults.eviction_policy);
                defaults.eviction_policy
            }),
            Err(_) => defaults.eviction_policy,
        };

        Self {
            max_memory_mb: parse_var("MAX_MEMORY_MB").unwrap_or(defaults.max_memory_mb),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            eviction_policy,
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Memory ceiling in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        (self.max_memory_mb as usize).saturating_mul(1024 * 1024)
    }

    /// Cleanup interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory_mb: 100,
            default_ttl: 3600,
            eviction_policy: EvictionPolicy::Lru,
            cleanup_interval_ms: 60_000,
            server_port: 3000,
        }
    }
}
