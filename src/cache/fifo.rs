//! FIFO Strategy Module
//!
//! Evicts in insertion order. Reads never change a key's position.

use std::collections::{HashMap, VecDeque};

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

// == FIFO Strategy ==
#[derive(Debug, Default)]
pub struct FifoStrategy {
    /// Front = oldest insertion
    queue: VecDeque<String>,
}

impl FifoStrategy {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl EvictionStrategy for FifoStrategy {
    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Fifo
    }

    fn select_victim(&mut self, entries: &HashMap<String, CacheEntry>) -> Option<String> {
        while let Some(key) = self.queue.front() {
            if entries.contains_key(key) {
                return Some(key.clone());
            }
            self.queue.pop_front();
        }
        None
    }

    fn on_insert(&mut self, key: &str, _entry: &CacheEntry) {
        self.queue.retain(|k| k != key);
        self.queue.push_back(key.to_string());
    }

    fn on_access(&mut self, _key: &str, _entry: &CacheEntry) {}

    fn on_remove(&mut self, key: &str) {
        self.queue.retain(|k| k != key);
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
