//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and pluggable eviction
//! under a memory ceiling.

mod entry;
mod eviction;
mod fifo;
mod lfu;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use eviction::{create_strategy, EvictionPolicy, EvictionStrategy, NoEviction};
pub use fifo::FifoStrategy;
pub use lfu::LfuStrategy;
pub use lru::LruStrategy;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{entry_size, CacheStore, SetOptions};

// == Public Constants ==
/// Maximum allowed key length in characters
pub const MAX_KEY_LENGTH: usize = 512;

/// Fixed bookkeeping cost charged per entry, in bytes
pub const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Size charged for a value whose serialized form cannot be measured
pub const UNSIZED_VALUE_BYTES: usize = 100;
