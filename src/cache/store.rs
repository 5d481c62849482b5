//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with a pluggable eviction
//! strategy, memory accounting and TTL expiration.

use std::collections::HashMap;

use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::cache::{
    create_strategy, current_timestamp_ms, CacheEntry, CacheStats, EvictionPolicy,
    EvictionStrategy, StatsSnapshot, ENTRY_OVERHEAD_BYTES, MAX_KEY_LENGTH, UNSIZED_VALUE_BYTES,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// A single `set` evicts at most one key per this many stored keys (rounded up).
const KEYS_PER_EVICTION: usize = 10;

// == Set Options ==
/// Per-call options for `CacheStore::set`.
#[derive(Debug, Clone, Copy)]
pub struct SetOptions {
    /// TTL in seconds; `None` uses the store default, `Some(0)` never expires
    pub ttl: Option<u64>,
    /// Replace an existing key (default: true)
    pub overwrite: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            overwrite: true,
        }
    }
}

impl SetOptions {
    pub fn with_ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }
}

// == Cache Store ==
/// Main cache storage with memory-bounded eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Active eviction policy bookkeeping
    strategy: Box<dyn EvictionStrategy>,
    /// Performance statistics
    stats: CacheStats,
    /// Memory ceiling in bytes
    max_memory_bytes: usize,
    /// Default TTL in seconds for entries without explicit TTL (0 = none)
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_memory_bytes` - Memory ceiling that triggers eviction
    /// * `default_ttl` - Default TTL in seconds, 0 means entries never expire
    /// * `policy` - Eviction policy used once the ceiling is reached
    pub fn new(max_memory_bytes: usize, default_ttl: u64, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            strategy: create_strategy(policy),
            stats: CacheStats::new(),
            max_memory_bytes,
            default_ttl,
        }
    }

    /// Creates a CacheStore from server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_memory_bytes(),
            config.default_ttl,
            config.eviction_policy,
        )
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// An existing key is replaced (TTL reset) unless `options.overwrite` is
    /// false. When the new entry would push memory usage to the ceiling,
    /// victims are evicted first; the insert happens even if eviction could
    /// not free enough room.
    pub fn set(&mut self, key: String, value: Value, options: SetOptions) -> Result<()> {
        validate_key(&key)?;

        if let Some(existing) = self.entries.get(&key) {
            if existing.is_expired() {
                self.remove_expired_entry(&key);
            } else if !options.overwrite {
                return Err(CacheError::KeyExists(key));
            } else {
                self.remove_entry(&key);
            }
        }

        let incoming = entry_size(&key, &value);
        if self
            .strategy
            .should_evict(self.memory_usage() + incoming, self.max_memory_bytes)
        {
            self.evict_for(incoming);
        }

        let ttl = options.ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(key, value, Some(ttl));
        self.insert_entry(entry);
        self.stats.record_write();
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and counted as both a miss and an expiry.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        let now = current_timestamp_ms();
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        if entry.is_expired_at(now) {
            self.remove_expired_entry(key);
            self.stats.record_miss();
            return Err(CacheError::Expired(key.to_string()));
        }

        entry.mark_accessed(now);
        self.strategy.on_access(key, entry);
        let value = entry.value().clone();
        self.stats.record_hit();
        Ok(value)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            self.stats.record_write();
        }
        removed
    }

    // == Has ==
    /// Existence probe. Leaves hit/miss counters and eviction order alone
    /// but still drops the entry if it has expired.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(),
        };
        if expired {
            self.remove_expired_entry(key);
        }
        !expired
    }

    // == TTL ==
    /// Remaining TTL in seconds for a key, `None` when it never expires.
    pub fn ttl(&mut self, key: &str) -> Result<Option<u64>> {
        Ok(self.live_entry(key)?.remaining_ttl())
    }

    // == Keys ==
    /// Lists non-expired keys without removing the expired ones.
    pub fn keys(&self) -> Vec<String> {
        let now = current_timestamp_ms();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Clear ==
    /// Removes every entry and resets eviction bookkeeping.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.strategy.clear();
        self.stats.record_write();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_expired_entry(key);
        }

        expired_keys.len()
    }

    // == Update TTL ==
    /// Replaces the entry with a fresh one carrying the same value and a new
    /// TTL (0 = never expires). Access history is not carried over.
    pub fn update_ttl(&mut self, key: &str, ttl_seconds: u64) -> Result<()> {
        let value = self.live_entry(key)?.value().clone();

        self.remove_entry(key);
        self.insert_entry(CacheEntry::new(key, value, Some(ttl_seconds)));
        self.stats.record_write();
        Ok(())
    }

    // == Increment ==
    /// Adds `delta` to a numeric value and returns the new number.
    ///
    /// The replacement entry keeps the original expiry. Integer values stay
    /// integers while the delta is integral and the sum fits in an i64.
    pub fn increment(&mut self, key: &str, delta: f64) -> Result<Number> {
        let now = current_timestamp_ms();
        let current = self.live_entry(key)?;

        let Value::Number(number) = current.value() else {
            return Err(CacheError::InvalidRequest(format!(
                "Value at '{}' is not a number",
                key
            )));
        };
        let Some(sum) = add_number(number, delta) else {
            return Err(CacheError::InvalidRequest(format!(
                "Incrementing '{}' by {} does not yield a finite number",
                key, delta
            )));
        };

        let mut replacement = current.with_value(Value::Number(sum.clone()), now);
        replacement.mark_accessed(now);
        self.strategy.on_access(key, &replacement);
        self.entries.insert(key.to_string(), replacement);
        self.stats.record_write();
        Ok(sum)
    }

    // == Stats ==
    /// Returns current cache statistics. Does not count as a read.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            &self.stats,
            self.entries.len(),
            self.memory_usage(),
            self.max_memory_bytes,
            self.strategy.policy(),
        )
    }

    // == Memory Usage ==
    /// Computed memory usage of all stored entries, in bytes.
    pub fn memory_usage(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, entry)| entry_size(key, entry.value()))
            .sum()
    }

    /// Read-only access to an entry, expired or not, with no side effects.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.strategy.policy()
    }

    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_bytes
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts until `incoming` more bytes fit under the ceiling, bounded to
    /// 10% of the current key count (at least one) per call.
    fn evict_for(&mut self, incoming: usize) {
        let max_evictions = self.entries.len().div_ceil(KEYS_PER_EVICTION).max(1);
        let mut evicted = 0;

        while evicted < max_evictions
            && self
                .strategy
                .should_evict(self.memory_usage() + incoming, self.max_memory_bytes)
        {
            let Some(victim) = self.strategy.select_victim(&self.entries) else {
                debug!("Eviction strategy has no victim left");
                break;
            };
            self.remove_entry(&victim);
            self.stats.record_eviction();
            evicted += 1;
            debug!("Evicted key '{}' ({})", victim, self.strategy.policy());
        }

        if self
            .strategy
            .should_evict(self.memory_usage() + incoming, self.max_memory_bytes)
        {
            warn!(
                "Memory ceiling still reached after evicting {} entries, inserting anyway",
                evicted
            );
        }
    }

    /// Looks up a live entry, lazily dropping it when expired.
    fn live_entry(&mut self, key: &str) -> Result<&CacheEntry> {
        let expired = match self.entries.get(key) {
            None => return Err(CacheError::NotFound(key.to_string())),
            Some(entry) => entry.is_expired(),
        };
        if expired {
            self.remove_expired_entry(key);
            return Err(CacheError::Expired(key.to_string()));
        }
        self.entries
            .get(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn insert_entry(&mut self, entry: CacheEntry) {
        let key = entry.key().to_string();
        self.strategy.on_insert(&key, &entry);
        self.entries.insert(key, entry);
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.strategy.on_remove(key);
        }
        removed
    }

    /// Shared by lazy expiry (get/has/ttl) and the cleanup sweep.
    fn remove_expired_entry(&mut self, key: &str) {
        if self.remove_entry(key).is_some() {
            self.stats.record_expired(1);
        }
    }
}

// == Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.chars().count() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

// == Sizing ==
/// Bytes charged for one entry: key + value + fixed overhead.
pub fn entry_size(key: &str, value: &Value) -> usize {
    key.len() + value_size(value) + ENTRY_OVERHEAD_BYTES
}

fn value_size(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len(),
        Value::Number(_) | Value::Null => 8,
        Value::Bool(_) => 1,
        Value::Array(_) | Value::Object(_) => serde_json::to_vec(value)
            .map(|bytes| bytes.len())
            .unwrap_or(UNSIZED_VALUE_BYTES),
    }
}

fn add_number(current: &Number, delta: f64) -> Option<Number> {
    let integral_delta = delta.fract() == 0.0 && delta.abs() < i64::MAX as f64;
    if let (Some(value), true) = (current.as_i64(), integral_delta) {
        if let Some(sum) = value.checked_add(delta as i64) {
            return Some(Number::from(sum));
        }
    }
    Number::from_f64(current.as_f64()? + delta)
}
