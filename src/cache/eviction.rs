//! Eviction Strategy Module
//!
//! Defines the eviction strategy abstraction and the factory that picks one
//! implementation per store.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, FifoStrategy, LfuStrategy, LruStrategy};

// == Eviction Policy ==
/// Eviction policy selected at store construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Memory ceiling is advisory only, nothing is evicted
    None,
    /// Least Recently Used
    Lru,
    /// Least Frequently Used, ties broken by oldest access
    Lfu,
    /// First In First Out, access does not matter
    Fifo,
}

impl EvictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::None => "none",
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Fifo => "fifo",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "noeviction" => Ok(EvictionPolicy::None),
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "fifo" => Ok(EvictionPolicy::Fifo),
            other => Err(format!("Unknown eviction policy '{}'", other)),
        }
    }
}

// == Eviction Strategy ==
/// Decides eviction order from insert/access/remove notifications.
///
/// Implementations keep their own bookkeeping next to the store. Keys that
/// were removed from the store without a matching `on_remove` are skipped
/// when choosing a victim, never returned.
pub trait EvictionStrategy: fmt::Debug + Send + Sync {
    /// Policy implemented by this strategy.
    fn policy(&self) -> EvictionPolicy;

    /// Whether `current_usage` bytes breaches a ceiling of `limit` bytes.
    fn should_evict(&self, current_usage: usize, limit: usize) -> bool {
        current_usage >= limit
    }

    /// Picks the next key to evict among the live `entries`.
    fn select_victim(&mut self, entries: &HashMap<String, CacheEntry>) -> Option<String>;

    fn on_insert(&mut self, key: &str, entry: &CacheEntry);

    fn on_access(&mut self, key: &str, entry: &CacheEntry);

    fn on_remove(&mut self, key: &str);

    /// Drops all bookkeeping.
    fn clear(&mut self);
}

// == No Eviction ==
/// Never evicts. Use when the memory ceiling is only informational.
#[derive(Debug, Default)]
pub struct NoEviction;

impl EvictionStrategy for NoEviction {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::None
    }

    fn should_evict(&self, _current_usage: usize, _limit: usize) -> bool {
        false
    }

    fn select_victim(&mut self, _entries: &HashMap<String, CacheEntry>) -> Option<String> {
        None
    }

    fn on_insert(&mut self, _key: &str, _entry: &CacheEntry) {}

    fn on_access(&mut self, _key: &str, _entry: &CacheEntry) {}

    fn on_remove(&mut self, _key: &str) {}

    fn clear(&mut self) {}
}

// == Factory ==
/// Builds the strategy for a policy.
pub fn create_strategy(policy: EvictionPolicy) -> Box<dyn EvictionStrategy> {
    match policy {
        EvictionPolicy::None => Box::new(NoEviction),
        EvictionPolicy::Lru => Box::new(LruStrategy::new()),
        EvictionPolicy::Lfu => Box::new(LfuStrategy::new()),
        EvictionPolicy::Fifo => Box::new(FifoStrategy::new()),
    }
}
