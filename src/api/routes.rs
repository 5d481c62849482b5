//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_delete_handler, batch_get_handler, batch_set_handler, cleanup_handler, clear_handler,
    delete_handler, exists_handler, expire_handler, get_handler, health_handler,
    increment_handler, keys_handler, set_handler, stats_handler, ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair
/// - `GET /get/:key` - Retrieve a value by key
/// - `DELETE /del/:key` - Delete a key
/// - `GET /has/:key` - Existence check
/// - `GET /keys` - List live keys
/// - `DELETE /clear` - Remove every key
/// - `PUT /expire/:key` - Replace a key's TTL
/// - `GET /ttl/:key` - Remaining TTL
/// - `POST /incr/:key` - Increment a numeric value
/// - `POST /mset`, `POST /mget`, `POST /mdel` - Batch operations
/// - `POST /cleanup` - Run an expiry sweep now
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health verdict
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/has/:key", get(exists_handler))
        .route("/keys", get(keys_handler))
        .route("/clear", delete(clear_handler))
        .route("/expire/:key", put(expire_handler))
        .route("/ttl/:key", get(ttl_handler))
        .route("/incr/:key", post(increment_handler))
        .route("/mset", post(batch_set_handler))
        .route("/mget", post(batch_get_handler))
        .route("/mdel", post(batch_delete_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
