use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use thiserror::Error;

use crate::types::ErrorResponse;

pub const NETWORK_NOT_FOUND: &str = "Network not found";
pub const MESSAGES_REQUIRED: &str = "Argument \"messages\" is required";

/// Request-level failure carrying the HTTP status returned to the caller
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn network_not_found() -> Self {
        Self::not_found(NETWORK_NOT_FOUND).with_code("NETWORK_NOT_FOUND")
    }

    pub fn messages_required() -> Self {
        Self::bad_request(MESSAGES_REQUIRED).with_code("MISSING_FIELD_MESSAGES")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.map(str::to_string),
            timestamp: Utc::now(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::messages_required().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Argument \"messages\" is required");
        assert_eq!(body.code.as_deref(), Some("MISSING_FIELD_MESSAGES"));
    }

    #[test]
    fn test_display_is_message() {
        let err = ApiError::network_not_found();
        assert_eq!(err.to_string(), "Network not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
