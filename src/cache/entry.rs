//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Key, value, creation time and expiry are fixed at construction. Changing
/// the TTL or the value means building a replacement entry. Only the access
/// metadata moves, and only through the owning store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    key: String,
    value: Value,
    /// Creation timestamp (Unix milliseconds)
    created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
    /// Last successful read (Unix milliseconds)
    last_accessed_at: u64,
    access_count: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds; `None` or `Some(0)` never expires
    pub fn new(key: impl Into<String>, value: Value, ttl_seconds: Option<u64>) -> Self {
        Self::new_at(key, value, ttl_seconds, current_timestamp_ms())
    }

    /// Creates a new cache entry as if constructed at `now` (Unix milliseconds).
    pub fn new_at(key: impl Into<String>, value: Value, ttl_seconds: Option<u64>, now: u64) -> Self {
        let expires_at = ttl_seconds
            .filter(|ttl| *ttl > 0)
            .map(|ttl| now.saturating_add(ttl.saturating_mul(1000)));

        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    pub fn last_accessed_at(&self) -> u64 {
        self.last_accessed_at
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry is expired strictly after its expiration timestamp; at the
    /// exact millisecond of expiry it is still readable.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Checks if the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds (rounded up), or None if the
    /// entry never expires.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_seconds)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn remaining_ttl_at(&self, now: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now).div_ceil(1000))
    }

    /// Remaining TTL in seconds against the wall clock.
    pub fn remaining_ttl(&self) -> Option<u64> {
        self.remaining_ttl_at(current_timestamp_ms())
    }

    /// Builds a replacement entry with a new value and the same absolute
    /// expiry. Access history starts over.
    pub fn with_value(&self, value: Value, now: u64) -> Self {
        Self {
            key: self.key.clone(),
            value,
            created_at: now,
            expires_at: self.expires_at,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    // == Mark Accessed ==
    /// Records a successful read.
    pub(crate) fn mark_accessed(&mut self, now: u64) {
        self.last_accessed_at = now;
        self.access_count += 1;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("k", json!("test_value"), None);

        assert_eq!(entry.key(), "k");
        assert_eq!(entry.value(), &json!("test_value"));
        assert!(entry.expires_at().is_none());
        assert!(!entry.is_expired());
        assert_eq!(entry.access_count(), 0);
        assert_eq!(entry.last_accessed_at(), entry.created_at());
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let entry = CacheEntry::new_at("k", json!(1), Some(0), 1_000);

        assert!(entry.expires_at().is_none());
        assert!(!entry.is_expired_at(u64::MAX));
        assert_eq!(entry.remaining_ttl_at(5_000), None);
    }

    #[test]
    fn test_expiration_boundary() {
        let entry = CacheEntry::new_at("k", json!("v"), Some(10), 1_000);

        assert_eq!(entry.expires_at(), Some(11_000));
        assert!(!entry.is_expired_at(10_999));
        assert!(!entry.is_expired_at(11_000));
        assert!(entry.is_expired_at(11_001));
    }

    #[test]
    fn test_remaining_ttl_rounds_up() {
        let entry = CacheEntry::new_at("k", json!("v"), Some(10), 0);

        assert_eq!(entry.remaining_ttl_at(0), Some(10));
        assert_eq!(entry.remaining_ttl_at(1), Some(10));
        assert_eq!(entry.remaining_ttl_at(9_001), Some(1));
        assert_eq!(entry.remaining_ttl_at(10_000), Some(0));
        assert_eq!(entry.remaining_ttl_at(20_000), Some(0));
    }

    #[test]
    fn test_with_value_keeps_expiry() {
        let original = CacheEntry::new_at("n", json!(1), Some(30), 1_000);
        let replacement = original.with_value(json!(2), 5_000);

        assert_eq!(replacement.key(), "n");
        assert_eq!(replacement.value(), &json!(2));
        assert_eq!(replacement.expires_at(), Some(31_000));
        assert_eq!(replacement.created_at(), 5_000);
        assert_eq!(original.value(), &json!(1));
    }

    #[test]
    fn test_mark_accessed() {
        let mut entry = CacheEntry::new_at("k", json!(null), None, 100);

        entry.mark_accessed(250);
        entry.mark_accessed(300);

        assert_eq!(entry.access_count(), 2);
        assert_eq!(entry.last_accessed_at(), 300);
        assert_eq!(entry.created_at(), 100);
    }
}
