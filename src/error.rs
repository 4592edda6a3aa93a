//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its diagnostics surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent or expired; callers treat this as a plain cache miss
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Value passed to set could not be encoded
    #[error("Encode failure: {0}")]
    Encode(String),

    /// Stored representation does not fit the requested type
    #[error("Decode failure: {0}")]
    Decode(String),

    /// Rejected cache configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cluster transport refused a publish
    #[error("Transport error: {0}")]
    Transport(String),
}

impl CacheError {
    /// Returns true for the expected miss case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Decode(_) => StatusCode::BAD_REQUEST,
            CacheError::Encode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::InvalidConfig(_) | CacheError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = CacheError::KeyNotFound("k".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_decode_maps_to_400() {
        let response = CacheError::Decode("bad shape".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_is_not_found() {
        assert!(CacheError::KeyNotFound("k".into()).is_not_found());
        assert!(!CacheError::Encode("x".into()).is_not_found());
    }
}
