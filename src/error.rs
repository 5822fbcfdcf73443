//! Hub error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the hub. Each variant
//! maps to a specific HTTP status code and structured JSON error
//! response. Connection-level I/O failures never become `RelayError`s —
//! they are terminal for their own connection and logged where they
//! happen.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "origin not allowed",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Upgrade request carried an origin outside the allowed policy.
    #[error("origin not allowed")]
    OriginForbidden,

    /// The hub's event queue has shut down and can take no more events.
    #[error("hub is no longer accepting events")]
    HubClosed,
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::OriginForbidden => 1001,
            Self::HubClosed => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::OriginForbidden => StatusCode::FORBIDDEN,
            Self::HubClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn origin_forbidden_maps_to_403() {
        let err = RelayError::OriginForbidden;
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn hub_closed_maps_to_503() {
        let err = RelayError::HubClosed;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 3001);
    }

    #[tokio::test]
    async fn response_body_is_structured_json() {
        let response = RelayError::OriginForbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("failed to read response body");
        };
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("response body is not JSON");
        };

        let error = body.get("error");
        let code = error.and_then(|e| e.get("code")).and_then(|c| c.as_u64());
        let message = error.and_then(|e| e.get("message")).and_then(|m| m.as_str());
        assert_eq!(code, Some(1001));
        assert_eq!(message, Some("origin not allowed"));
        // `details` is skipped when `None`.
        assert!(error.and_then(|e| e.get("details")).is_none());
    }
}
