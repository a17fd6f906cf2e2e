//! API error handling for the marketplace backend

use crate::pricing::PricingError;
use crate::storage::StorageError;
use crate::stores::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API error payload returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: u64,
}

impl ApiError {
    pub fn new(code: u16, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn with_details(code: u16, message: String, details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(404, message.to_string())
    }

    pub fn unprocessable_entity(message: &str) -> Self {
        Self::new(422, message.to_string())
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::new(500, message.to_string())
    }

    pub fn upstream_failure(message: &str) -> Self {
        Self::with_details(
            500,
            "Upstream request failed".to_string(),
            serde_json::json!({ "reason": message }),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Maps the store taxonomy onto HTTP: NotFound -> 404, duplicate id -> 400,
/// bad patch value -> 422, storage/corruption -> 500.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::not_found(&format!("{what} not found")),
            StoreError::DuplicateItem(_) => Self::bad_request(&err.to_string()),
            StoreError::InvalidField(_) => Self::unprocessable_entity(&err.to_string()),
            StoreError::Corrupt { .. } => Self::internal_server_error(&err.to_string()),
            StoreError::Storage(inner) => inner.into(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { key } => Self::not_found(&format!("{key} not found")),
            other => Self::internal_server_error(&other.to_string()),
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::ZeroRecommendation => Self::unprocessable_entity(&err.to_string()),
            other => Self::internal_server_error(&other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_server_error(&err.to_string())
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_the_documented_status_codes() {
        assert_eq!(ApiError::from(StoreError::NotFound("x".into())).code, 404);
        assert_eq!(ApiError::from(StoreError::DuplicateItem("a".into())).code, 400);
        assert_eq!(ApiError::from(StoreError::InvalidField("f".into())).code, 422);
        assert_eq!(
            ApiError::from(StoreError::Storage(StorageError::Backend("boom".into()))).code,
            500
        );
    }

    #[test]
    fn zero_recommendation_is_unprocessable() {
        assert_eq!(ApiError::from(PricingError::ZeroRecommendation).code, 422);
    }
}
