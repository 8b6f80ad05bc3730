//! HTTP error types and implementations

#[cfg(feature = "server")]
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hrdesk_core::SessionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MalformedToken(_) | SessionError::TokenExpired { .. } => {
                Self::AuthenticationFailed(err.to_string())
            }
            SessionError::UnknownRole(_) | SessionError::Serialization(_) => {
                Self::BadRequest(err.to_string())
            }
            SessionError::Persistence(_) => Self::InternalServerError(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(feature = "server")]
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::AuthenticationFailed(_) => (StatusCode::UNAUTHORIZED, "authentication_failed"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_status_classes() {
        assert!(matches!(
            HttpError::from(SessionError::TokenExpired {
                expired_at: "2024-01-01T00:00:00Z".to_string()
            }),
            HttpError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            HttpError::from(SessionError::UnknownRole("employee".to_string())),
            HttpError::BadRequest(_)
        ));
        assert!(matches!(
            HttpError::from(SessionError::persistence("disk full")),
            HttpError::InternalServerError(_)
        ));
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_into_response_status() {
        let response = HttpError::AuthenticationFailed("expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
