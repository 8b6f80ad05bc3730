//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// The API answered 401; the local session has been ended
    #[error("Session expired")]
    SessionExpired,

    /// No session to authenticate the call with
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from a non-success, non-401 HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::SessionExpired,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the user has to sign in again
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }

    /// Short text suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
            Self::Forbidden(_) => "You do not have permission to do that.".to_string(),
            Self::NotFound(_) => "The requested item could not be found.".to_string(),
            Self::BadRequest(message) if !message.is_empty() => message.clone(),
            Self::BadRequest(_) => "The request was invalid.".to_string(),
            Self::Request(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::ServerError { .. } | Self::Serialization(_) | Self::Configuration(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
