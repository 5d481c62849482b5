//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    validate_key, BatchKeysRequest, BatchSetRequest, ExpireRequest, IncrementRequest, SetRequest,
    MAX_BATCH_SIZE, MAX_TTL_SECONDS,
};
pub use responses::{
    BatchGetResponse, BatchItemResult, BatchResponse, CleanupResponse, DeleteResponse,
    ErrorResponse, ExistsResponse, GetResponse, IncrementResponse, KeysResponse, MessageResponse,
    SetResponse, TtlResponse,
};
