//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - Single key operations
//! - `GET /has/:key`, `GET /ttl/:key`, `PUT /expire/:key`, `POST /incr/:key`
//! - `GET /keys`, `DELETE /clear`
//! - `POST /mset`, `POST /mget`, `POST /mdel` - Batch operations
//! - `POST /cleanup` - Immediate expiry sweep
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health verdict

pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::ApiJson;
pub use handlers::*;
pub use routes::create_router;
