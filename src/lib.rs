//! Mini Cache - A lightweight in-memory cache server
//!
//! Provides Redis-like functionality with TTL expiration and memory-bounded
//! eviction (none, LRU, LFU or FIFO).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, EvictionPolicy, SetOptions};
pub use config::Config;
pub use tasks::{CleanupSweeper, StatsReporter};
