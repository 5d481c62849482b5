//! LFU Strategy Module
//!
//! Least Frequently Used eviction with a recency tie-break.

use std::collections::HashMap;

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

// == LFU Strategy ==
/// Counts accesses per key.
///
/// Victim selection is a full scan: lowest count wins, equal counts fall
/// back to the entry read least recently, then to key order.
#[derive(Debug, Default)]
pub struct LfuStrategy {
    frequencies: HashMap<String, u64>,
}

impl LfuStrategy {
    pub fn new() -> Self {
        Self {
            frequencies: HashMap::new(),
        }
    }

    /// Current frequency recorded for a key.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        self.frequencies.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl EvictionStrategy for LfuStrategy {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lfu
    }

    fn select_victim(&mut self, entries: &HashMap<String, CacheEntry>) -> Option<String> {
        let mut best: Option<(u64, u64, &String)> = None;

        for (key, &frequency) in &self.frequencies {
            let Some(entry) = entries.get(key) else {
                continue;
            };
            let candidate = (frequency, entry.last_accessed_at(), key);
            if best.map_or(true, |current| candidate < current) {
                best = Some(candidate);
            }
        }

        let victim = best.map(|(_, _, key)| key.clone());
        self.frequencies.retain(|key, _| entries.contains_key(key));
        victim
    }

    fn on_insert(&mut self, key: &str, _entry: &CacheEntry) {
        self.frequencies.insert(key.to_string(), 1);
    }

    fn on_access(&mut self, key: &str, _entry: &CacheEntry) {
        *self.frequencies.entry(key.to_string()).or_insert(0) += 1;
    }

    fn on_remove(&mut self, key: &str) {
        self.frequencies.remove(key);
    }

    fn clear(&mut self) {
        self.frequencies.clear();
    }
}
