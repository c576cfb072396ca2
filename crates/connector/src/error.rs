//! Unified error handling for the connector API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::platform::PlatformError;

/// Application-level error type for the connector surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller's payload failed validation; every problem is listed.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The addressed entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write collided with existing state (duplicate coupon code).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure in the platform or the connector itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Translate a platform failure, attaching operation context to the
    /// internal variant.
    pub fn from_platform(err: PlatformError, context: &str) -> Self {
        match err {
            PlatformError::NotFound(what) => Self::NotFound(what),
            PlatformError::AlreadyExists(what) => Self::Conflict(what),
            PlatformError::Storage(detail) => Self::Internal(format!("{context}: {detail}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Server errors are captured with Sentry; client errors are not.
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Connector request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients.
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Validation(vec!["name is required".to_string(), "bad date".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: name is required; bad date");

        let err = ApiError::NotFound("rule 9".to_string());
        assert_eq!(err.to_string(), "Not found: rule 9");
    }

    #[test]
    fn test_api_error_status_codes() {
        fn get_status(err: ApiError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(ApiError::Validation(vec!["x".to_string()])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ApiError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_platform_error_translation() {
        let err = ApiError::from_platform(
            PlatformError::AlreadyExists("coupon code SAVE10".to_string()),
            "create coupon",
        );
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = ApiError::from_platform(
            PlatformError::Storage("connection reset".to_string()),
            "create coupon",
        );
        assert!(matches!(err, ApiError::Internal(m) if m.contains("create coupon")));
    }
}
