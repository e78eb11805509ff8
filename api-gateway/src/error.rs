//! Error types for webhook execution and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Message returned for every failure past validation
pub const GENERIC_ERROR: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Unknown webhook: {0}")]
    NotFound(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Request timeout after {0:?} - server not responding")]
    Timeout(Duration),

    #[error("Connection refused - server may be down: {0}")]
    Unreachable(String),

    #[error("Webhook request failed: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Upstream returned invalid JSON: {0}")]
    InvalidResponse(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::NotFound(_) => StatusCode::NOT_FOUND,
            WebhookError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message may be shown to the caller as-is
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Classify a reqwest failure
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            WebhookError::Timeout(timeout)
        } else if err.is_connect() {
            WebhookError::Unreachable(err.to_string())
        } else {
            WebhookError::Transport(err.to_string())
        }
    }
}

/// Error body returned by the HTTP boundary: `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        if err.is_client_error() {
            Self::new(err.status_code(), err.to_string())
        } else {
            Self::internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_errors() {
        let err = WebhookError::Validation(vec![
            "Missing required field: a".into(),
            "Missing required field: b".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Missing required field: a, Missing required field: b"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WebhookError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(WebhookError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::Timeout(Duration::from_secs(1)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::UpstreamStatus { status: 502, body: "bad gateway".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_passed_through() {
        let api: ApiError = WebhookError::NotFound("unknown-name".into()).into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
        assert_eq!(api.message(), "Unknown webhook: unknown-name");
    }

    #[test]
    fn test_upstream_details_not_leaked() {
        let api: ApiError = WebhookError::UpstreamStatus {
            status: 500,
            body: "stack trace at n8n/core".into(),
        }
        .into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), GENERIC_ERROR);

        let api: ApiError = WebhookError::Unreachable("tcp connect error".into()).into();
        assert_eq!(api.message(), GENERIC_ERROR);
    }
}
