//! LRU Strategy Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{HashMap, VecDeque};

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

// == LRU Strategy ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are stored in a VecDeque where:
/// - Front = Least recently used
/// - Back = Most recently used
#[derive(Debug, Default)]
pub struct LruStrategy {
    /// Order of keys by access time
    order: VecDeque<String>,
}

impl LruStrategy {
    // == Constructor ==
    /// Creates a new empty LRU strategy.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to back).
    fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl EvictionStrategy for LruStrategy {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lru
    }

    fn select_victim(&mut self, entries: &HashMap<String, CacheEntry>) -> Option<String> {
        // Drop stale keys from the front until a live one shows up
        while let Some(key) = self.order.front() {
            if entries.contains_key(key) {
                return Some(key.clone());
            }
            self.order.pop_front();
        }
        None
    }

    fn on_insert(&mut self, key: &str, _entry: &CacheEntry) {
        self.touch(key);
    }

    fn on_access(&mut self, key: &str, _entry: &CacheEntry) {
        self.touch(key);
    }

    fn on_remove(&mut self, key: &str) {
        self.remove(key);
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}
