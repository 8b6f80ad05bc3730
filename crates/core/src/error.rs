//! Session error types

use thiserror::Error;

/// Standard result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session layer.
///
/// Guards never return these; a malformed or expired token is simply treated
/// as "no session". Only callers that asked for a mutation (login) or a
/// persistence write see them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token expired at {expired_at}")]
    TokenExpired { expired_at: String },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SessionError {
    /// Create a malformed token error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken(message.into())
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// True for errors caused by the token itself rather than storage
    pub const fn is_token_error(&self) -> bool {
        matches!(self, Self::MalformedToken(_) | Self::TokenExpired { .. })
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
