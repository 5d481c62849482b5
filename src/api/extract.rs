//! Request Extractors
//!
//! JSON body extraction that reports rejections through `CacheError`, so a
//! malformed or mistyped body is a 400 with the usual `{"error": ...}` body.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::CacheError;

/// Drop-in replacement for `Json<T>` as a request extractor.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CacheError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for CacheError {
    fn from(rejection: JsonRejection) -> Self {
        CacheError::InvalidRequest(rejection.body_text())
    }
}

/// Parses an optional JSON body: empty (or whitespace) yields `None`.
pub fn parse_optional_body<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, CacheError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| CacheError::InvalidRequest(format!("Invalid JSON body: {}", err)))
}
