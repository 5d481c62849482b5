//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store behaviour over generated operation sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::cache::{
    CacheStore, EvictionPolicy, SetOptions, ENTRY_OVERHEAD_BYTES, MAX_KEY_LENGTH,
};

// == Test Configuration ==
const TEST_MAX_MEMORY: usize = 1 << 20;
const TEST_DEFAULT_TTL: u64 = 300;
/// Every generated eviction entry costs exactly this many bytes
const ENTRY_BYTES: usize = 100;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Short keys so a padded value can bring every entry to `ENTRY_BYTES`
fn short_key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,16}".prop_map(|s| s)
}

/// Generates JSON values of every shape the store accepts
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,64}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
    Has { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), json_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Has { key }),
    ]
}

fn padded_value(key: &str) -> Value {
    Value::String("v".repeat(ENTRY_BYTES - ENTRY_OVERHEAD_BYTES - key.len()))
}

fn unique(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

fn fill(store: &mut CacheStore, keys: &[String]) {
    for key in keys {
        store
            .set(key.clone(), padded_value(key), SetOptions::default())
            .unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses match what get() reported; has() and stats() never count.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lru);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value, SetOptions::default());
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Ok(_) => expected_hits += 1,
                    Err(_) => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
                CacheOp::Has { key } => {
                    store.has(&key);
                }
            }
            let _ = store.stats();
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_keys, store.len(), "Total keys mismatch");

        let total = expected_hits + expected_misses;
        let expected_rate = if total == 0 {
            0.0
        } else {
            (expected_hits as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };
        prop_assert_eq!(stats.hit_rate, expected_rate);
    }

    // A stored value comes back unchanged, whatever its JSON shape.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in json_value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lfu);

        store.set(key.clone(), value.clone(), SetOptions::default()).unwrap();

        prop_assert_eq!(store.get(&key).unwrap(), value);
    }

    // Zero TTL means the entry never expires.
    #[test]
    fn prop_zero_ttl_is_unlimited(key in valid_key_strategy(), value in json_value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Fifo);

        store.set(key.clone(), value, SetOptions::with_ttl(0)).unwrap();

        prop_assert_eq!(store.ttl(&key).unwrap(), None);
        prop_assert!(store.has(&key));
    }

    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in json_value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lru);

        store.set(key.clone(), value, SetOptions::default()).unwrap();
        prop_assert!(store.has(&key), "Key should exist before delete");

        prop_assert!(store.delete(&key));
        prop_assert!(store.get(&key).is_err(), "Key should not exist after delete");
        prop_assert!(!store.delete(&key));
    }

    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in json_value_strategy(),
        value2 in json_value_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lru);

        store.set(key.clone(), value1, SetOptions::default()).unwrap();
        store.set(key.clone(), value2.clone(), SetOptions::default()).unwrap();

        prop_assert_eq!(store.get(&key).unwrap(), value2);
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // Incrementing a non-number fails and leaves the value alone.
    #[test]
    fn prop_increment_requires_number(key in valid_key_strategy(), text in "[a-z]{0,20}", delta in -1000i64..1000) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lru);

        store.set(key.clone(), json!(text.clone()), SetOptions::default()).unwrap();
        prop_assert!(store.increment(&key, delta as f64).is_err());
        prop_assert_eq!(store.get(&key).unwrap(), json!(text));

        store.set(key.clone(), json!(7), SetOptions::default()).unwrap();
        let sum = store.increment(&key, delta as f64).unwrap();
        prop_assert_eq!(sum.as_i64(), Some(7 + delta));
    }

    // A single set never evicts more than ceil(len / 10) keys (at least one).
    #[test]
    fn prop_eviction_is_bounded(
        keys in prop::collection::vec(short_key_strategy(), 1..60),
        big in 100usize..5000
    ) {
        let keys = unique(keys);
        let limit = keys.len() * ENTRY_BYTES;
        let mut store = CacheStore::new(limit, 0, EvictionPolicy::Lru);
        fill(&mut store, &keys);

        let before_len = store.len();
        let before = store.stats().evictions;
        store
            .set("incoming".to_string(), Value::String("z".repeat(big)), SetOptions::default())
            .unwrap();
        let evicted = store.stats().evictions - before;

        prop_assert!(evicted as usize <= before_len.div_ceil(10).max(1));
        prop_assert!(store.peek("incoming").is_some(), "Insert always proceeds");
    }

    // Clearing leaves nothing behind.
    #[test]
    fn prop_clear_empties_store(entries in prop::collection::vec((valid_key_strategy(), json_value_strategy()), 0..30)) {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lfu);
        for (key, value) in entries {
            store.set(key, value, SetOptions::default()).unwrap();
        }

        store.clear();

        prop_assert!(store.keys().is_empty());
        prop_assert_eq!(store.stats().total_keys, 0);
        prop_assert_eq!(store.memory_usage(), 0);
        prop_assert_eq!(store.cleanup_expired(), 0);
    }
}

// Property tests for eviction order
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // With room for exactly the initial keys, adding one more evicts the
    // oldest key under LRU and FIFO alike.
    #[test]
    fn prop_eviction_order_without_access(
        initial_keys in prop::collection::vec(short_key_strategy(), 2..10),
        new_key in short_key_strategy(),
        policy in prop_oneof![Just(EvictionPolicy::Lru), Just(EvictionPolicy::Fifo)]
    ) {
        let unique_keys = unique(initial_keys);
        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = CacheStore::new(capacity * ENTRY_BYTES + ENTRY_BYTES / 2, 0, policy);
        fill(&mut store, &unique_keys);
        prop_assert_eq!(store.len(), capacity, "Cache should be at capacity");

        store.set(new_key.clone(), padded_value(&new_key), SetOptions::default()).unwrap();

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.peek(&unique_keys[0]).is_none(), "Oldest key should have been evicted");
        prop_assert!(store.peek(&new_key).is_some());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.peek(key).is_some(), "Key '{}' should still exist", key);
        }
    }

    // Reading the oldest key protects it under LRU but not under FIFO.
    #[test]
    fn prop_access_tracking_by_policy(
        keys in prop::collection::vec(short_key_strategy(), 3..8),
        new_key in short_key_strategy()
    ) {
        let unique_keys = unique(keys);
        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));
        let limit = unique_keys.len() * ENTRY_BYTES + ENTRY_BYTES / 2;

        let mut lru = CacheStore::new(limit, 0, EvictionPolicy::Lru);
        let mut fifo = CacheStore::new(limit, 0, EvictionPolicy::Fifo);
        for store in [&mut lru, &mut fifo] {
            fill(store, &unique_keys);
            store.get(&unique_keys[0]).unwrap();
            store.set(new_key.clone(), padded_value(&new_key), SetOptions::default()).unwrap();
        }

        prop_assert!(lru.peek(&unique_keys[0]).is_some());
        prop_assert!(lru.peek(&unique_keys[1]).is_none());
        prop_assert!(fifo.peek(&unique_keys[0]).is_none());
        prop_assert!(fifo.peek(&unique_keys[1]).is_some());
    }

    // The never-read key is evicted first under LFU.
    #[test]
    fn prop_lfu_evicts_unread_key(
        keys in prop::collection::vec(short_key_strategy(), 3..8),
        cold_index in 0usize..8,
        new_key in short_key_strategy()
    ) {
        let unique_keys = unique(keys);
        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));
        let cold = cold_index % unique_keys.len();

        let limit = unique_keys.len() * ENTRY_BYTES + ENTRY_BYTES / 2;
        let mut store = CacheStore::new(limit, 0, EvictionPolicy::Lfu);
        fill(&mut store, &unique_keys);
        for (i, key) in unique_keys.iter().enumerate() {
            if i != cold {
                store.get(key).unwrap();
            }
        }

        store.set(new_key.clone(), padded_value(&new_key), SetOptions::default()).unwrap();

        prop_assert!(store.peek(&unique_keys[cold]).is_none());
        prop_assert_eq!(store.len(), unique_keys.len());
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error variant renders as JSON with a string "error" field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(error_msg.clone()),
            CacheError::Expired(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
            CacheError::KeyExists(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Concurrent tasks sharing the store through one RwLock leave it
    // consistent: every listed key is readable and counters add up.
    #[test]
    fn prop_concurrent_operation_correctness(
        initial_entries in prop::collection::vec((valid_key_strategy(), json_value_strategy()), 1..20),
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let get_count = operations
            .iter()
            .filter(|op| matches!(op, CacheOp::Get { .. }))
            .count() as u64;

        let result: Result<(), TestCaseError> = tokio_test::block_on(async {
            let store = Arc::new(RwLock::new(CacheStore::new(
                TEST_MAX_MEMORY,
                TEST_DEFAULT_TTL,
                EvictionPolicy::Lru,
            )));

            {
                let mut cache = store.write().await;
                for (key, value) in &initial_entries {
                    cache.set(key.clone(), value.clone(), SetOptions::default()).unwrap();
                }
            }

            let mut handles = vec![];
            for op in operations {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    match op {
                        CacheOp::Set { key, value } => {
                            cache.set(key, value, SetOptions::default()).unwrap();
                        }
                        CacheOp::Get { key } => {
                            let _ = cache.get(&key);
                        }
                        CacheOp::Delete { key } => {
                            cache.delete(&key);
                        }
                        CacheOp::Has { key } => {
                            cache.has(&key);
                        }
                    }
                }));
            }

            for handle in handles {
                prop_assert!(handle.await.is_ok(), "Task should not panic");
            }

            let mut cache = store.write().await;
            let stats = cache.stats();
            prop_assert_eq!(stats.hits + stats.misses, get_count);
            prop_assert_eq!(stats.total_keys, cache.keys().len());
            for key in cache.keys() {
                prop_assert!(cache.get(&key).is_ok());
            }
            Ok(())
        });
        result?;
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_length_validation() {
        let mut store = CacheStore::new(TEST_MAX_MEMORY, TEST_DEFAULT_TTL, EvictionPolicy::Lru);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(long_key, json!("value"), SetOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_padded_values_have_fixed_size() {
        for key in ["a", "abcdefghijklmnop"] {
            assert_eq!(crate::cache::entry_size(key, &padded_value(key)), ENTRY_BYTES);
        }
    }

    #[test]
    fn test_error_status_codes() {
        use crate::error::CacheError;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::Expired("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::KeyExists("key".to_string()), StatusCode::CONFLICT),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }
}
