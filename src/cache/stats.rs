//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! expirations, and the snapshot handed out to callers.

use serde::Serialize;

use crate::cache::{current_timestamp_ms, EvictionPolicy};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Stats ==
/// Monotonic counters owned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by the eviction policy
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
    /// Successful mutations: set, delete, TTL update, increment, clear
    pub writes: u64,
    /// Store creation time (Unix milliseconds)
    pub started_at: u64,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            evictions: 0,
            expired: 0,
            writes: 0,
            started_at: current_timestamp_ms(),
        }
    }

    // == Hit Rate ==
    /// Hit rate as a percentage rounded to two decimals, 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            round2(self.hits as f64 / total as f64 * 100.0)
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    /// Seconds since the store was created.
    pub fn uptime_seconds(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.started_at) / 1000
    }
}

// == Stats Snapshot ==
/// Point-in-time view returned by `CacheStore::stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_keys: usize,
    pub memory_usage_bytes: usize,
    pub memory_usage_mb: f64,
    pub max_memory_bytes: usize,
    pub max_memory_mb: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    pub writes: u64,
    /// Percentage, two decimals
    pub hit_rate: f64,
    pub uptime_seconds: u64,
    pub eviction_policy: EvictionPolicy,
}

impl StatsSnapshot {
    pub(crate) fn new(
        counters: &CacheStats,
        total_keys: usize,
        memory_usage_bytes: usize,
        max_memory_bytes: usize,
        eviction_policy: EvictionPolicy,
    ) -> Self {
        Self {
            total_keys,
            memory_usage_bytes,
            memory_usage_mb: round2(memory_usage_bytes as f64 / BYTES_PER_MB),
            max_memory_bytes,
            max_memory_mb: round2(max_memory_bytes as f64 / BYTES_PER_MB),
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expired: counters.expired,
            writes: counters.writes,
            hit_rate: counters.hit_rate(),
            uptime_seconds: counters.uptime_seconds(),
            eviction_policy,
        }
    }

    /// Total number of reads (hits + misses).
    pub fn total_reads(&self) -> u64 {
        self.hits + self.misses
    }

    /// Reads plus writes, the figure throughput is measured on.
    pub fn total_operations(&self) -> u64 {
        self.total_reads() + self.writes
    }

    /// Fraction of the memory ceiling in use, 0.0 when no ceiling is set.
    pub fn memory_ratio(&self) -> f64 {
        if self.max_memory_bytes == 0 {
            0.0
        } else {
            self.memory_usage_bytes as f64 / self.max_memory_bytes as f64
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
