//! JSON body extraction
//!
//! [`ApiJson`] replaces `axum::Json` for request bodies so that decoding
//! failures come back in the API error shape. A value the target type
//! refuses (a wrong type, an amount with too many decimal places) is a 422
//! naming the offending field as a path such as `items[0].unit_price`.
//! Malformed JSON is a 400.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::ApiError;

/// A JSON request body decoded into `T`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T: DeserializeOwned> ApiJson<T> {
    /// Decodes a complete JSON document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let value = serde_path_to_error::deserialize(&mut de).map_err(decode_error)?;
        de.end().map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(ApiJson(value))
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(&req) {
            return Err(ApiError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Self::from_bytes(&bytes)
    }
}

fn has_json_content_type(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or_default().trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn decode_error(err: serde_path_to_error::Error<serde_json::Error>) -> ApiError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    match inner.classify() {
        Category::Data => ApiError::Validation {
            message: inner.to_string(),
            // "." is the document root
            field: (path != ".").then_some(path),
        },
        _ => ApiError::BadRequest(inner.to_string()),
    }
}
