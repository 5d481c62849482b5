//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and the validation
//! the HTTP layer applies before anything reaches the cache store.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Upper bound for any TTL accepted over HTTP (one year)
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Maximum number of items in one batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Validates a key: non-empty, bounded length, `[A-Za-z0-9_\-:]` only.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.chars().count() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
    {
        return Some(format!(
            "Key '{}' may only contain letters, digits, '_', '-' and ':'",
            key
        ));
    }
    None
}

fn validate_ttl(ttl: Option<u64>) -> Option<String> {
    match ttl {
        Some(ttl) if ttl > MAX_TTL_SECONDS => Some(format!(
            "TTL exceeds maximum of {} seconds",
            MAX_TTL_SECONDS
        )),
        _ => None,
    }
}

fn validate_batch_len(len: usize) -> Option<String> {
    if len == 0 {
        return Some("Batch cannot be empty".to_string());
    }
    if len > MAX_BATCH_SIZE {
        return Some(format!(
            "Batch exceeds maximum of {} items",
            MAX_BATCH_SIZE
        ));
    }
    None
}

fn default_overwrite() -> bool {
    true
}

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (store default if absent, 0 = never expire)
/// - `overwrite`: Replace an existing key (default true)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key).or_else(|| validate_ttl(self.ttl))
    }
}

/// Request body for PUT /expire/:key
#[derive(Debug, Clone, Deserialize)]
pub struct ExpireRequest {
    pub ttl: u64,
}

impl ExpireRequest {
    pub fn validate(&self) -> Option<String> {
        validate_ttl(Some(self.ttl))
    }
}

/// Request body for POST /incr/:key. A missing body field increments by one.
#[derive(Debug, Clone, Deserialize)]
pub struct IncrementRequest {
    #[serde(default = "default_delta")]
    pub delta: f64,
}

fn default_delta() -> f64 {
    1.0
}

impl IncrementRequest {
    pub fn validate(&self) -> Option<String> {
        if self.delta.is_finite() {
            None
        } else {
            Some("Increment delta must be a finite number".to_string())
        }
    }
}

/// Request body for POST /mset
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSetRequest {
    pub items: Vec<SetRequest>,
}

impl BatchSetRequest {
    /// Validates the batch as a whole. Items are validated one by one.
    pub fn validate(&self) -> Option<String> {
        validate_batch_len(self.items.len())
    }
}

/// Request body for POST /mget and POST /mdel
#[derive(Debug, Clone, Deserialize)]
pub struct BatchKeysRequest {
    pub keys: Vec<String>,
}

impl BatchKeysRequest {
    pub fn validate(&self) -> Option<String> {
        validate_batch_len(self.keys.len())
    }
}
