//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::extract::{parse_optional_body, ApiJson};

use crate::cache::{CacheStore, SetOptions, StatsSnapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, BatchGetResponse, BatchItemResult, BatchKeysRequest, BatchResponse,
    BatchSetRequest, CleanupResponse, DeleteResponse, ExistsResponse, ExpireRequest,
    GetResponse, IncrementRequest, IncrementResponse, KeysResponse, MessageResponse, SetRequest,
    SetResponse, TtlResponse,
};
use crate::tasks::{CleanupSweeper, HealthReport, StatsReporter};

/// Application state shared across all handlers.
///
/// The cache store sits behind one `Arc<RwLock<>>`; the sweeper and the
/// reporter go through the same lock as the handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    pub sweeper: Arc<CleanupSweeper>,
    pub reporter: Arc<StatsReporter>,
}

impl AppState {
    /// Creates a new AppState around the given cache store with default
    /// background task settings. Tasks are not started.
    pub fn new(cache: CacheStore) -> Self {
        Self::with_config(cache, &Config::default())
    }

    /// Creates a new AppState from configuration.
    ///
    /// Initializes the cache store with parameters from the Config.
    pub fn from_config(config: &Config) -> Self {
        Self::with_config(CacheStore::from_config(config), config)
    }

    fn with_config(cache: CacheStore, config: &Config) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let sweeper = Arc::new(CleanupSweeper::from_config(cache.clone(), config));
        let reporter = Arc::new(StatsReporter::new(cache.clone(), sweeper.clone()));
        Self {
            cache,
            sweeper,
            reporter,
        }
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SetRequest>,
) -> Result<(StatusCode, Json<SetResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let options = SetOptions {
        ttl: req.ttl,
        overwrite: req.overwrite,
    };
    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, options)?;

    Ok((StatusCode::CREATED, Json(SetResponse::new(req.key))))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    // Write lock: reads update access order and stats
    let mut cache = state.cache.write().await;
    let value = cache.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    let mut cache = state.cache.write().await;
    if !cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /has/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let key = checked_key(key)?;
    let exists = state.cache.write().await.has(&key);

    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    let keys = state.cache.read().await.keys();
    Json(KeysResponse::new(keys))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.write().await.clear();
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for PUT /expire/:key
pub async fn expire_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<ExpireRequest>,
) -> Result<Json<MessageResponse>> {
    let key = checked_key(key)?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.write().await.update_ttl(&key, req.ttl)?;
    Ok(Json(MessageResponse::new(format!(
        "TTL for '{}' set to {} seconds",
        key, req.ttl
    ))))
}

/// Handler for GET /ttl/:key
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TtlResponse>> {
    let key = checked_key(key)?;
    let remaining = state.cache.write().await.ttl(&key)?;

    Ok(Json(TtlResponse::new(key, remaining)))
}

/// Handler for POST /incr/:key
///
/// The body is optional; an empty body increments by one. Anything else must
/// parse as an `IncrementRequest`.
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<IncrementResponse>> {
    let key = checked_key(key)?;
    let delta = match parse_optional_body::<IncrementRequest>(&body)? {
        Some(req) => {
            if let Some(error_msg) = req.validate() {
                return Err(CacheError::InvalidRequest(error_msg));
            }
            req.delta
        }
        None => 1.0,
    };

    let value = state.cache.write().await.increment(&key, delta)?;
    Ok(Json(IncrementResponse { key, value }))
}

/// Handler for POST /mset
///
/// Each item is validated and stored on its own; failures do not roll back
/// the items that succeeded.
pub async fn batch_set_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchSetRequest>,
) -> Result<Json<BatchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let results = req
        .items
        .into_iter()
        .map(|item| {
            let outcome = match item.validate() {
                Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
                None => cache.set(
                    item.key.clone(),
                    item.value,
                    SetOptions {
                        ttl: item.ttl,
                        overwrite: item.overwrite,
                    },
                ),
            };
            BatchItemResult {
                key: item.key,
                success: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            }
        })
        .collect();

    Ok(Json(BatchResponse::new(results)))
}

/// Handler for POST /mget
pub async fn batch_get_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchKeysRequest>,
) -> Result<Json<BatchGetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let mut found = BTreeMap::new();
    let mut missing = Vec::new();
    for key in req.keys {
        let value = match validate_key(&key) {
            Some(_) => None,
            None => cache.get(&key).ok(),
        };
        match value {
            Some(value) => {
                found.insert(key, value);
            }
            None => missing.push(key),
        }
    }

    Ok(Json(BatchGetResponse { found, missing }))
}

/// Handler for POST /mdel
pub async fn batch_delete_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchKeysRequest>,
) -> Result<Json<BatchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let results = req
        .keys
        .into_iter()
        .map(|key| {
            let error = match validate_key(&key) {
                Some(error_msg) => Some(CacheError::InvalidRequest(error_msg).to_string()),
                None if cache.delete(&key) => None,
                None => Some(CacheError::NotFound(key.clone()).to_string()),
            };
            BatchItemResult {
                key,
                success: error.is_none(),
                error,
            }
        })
        .collect();

    Ok(Json(BatchResponse::new(results)))
}

/// Handler for POST /cleanup
///
/// Runs one sweeper pass right away.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.sweeper.force_cleanup().await;
    Json(CleanupResponse { removed })
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /health
///
/// Returns the reporter's health verdict.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.reporter.health().await)
}
