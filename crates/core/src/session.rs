//! Typed session record

use crate::error::{SessionError, SessionResult};
use crate::role::Role;
use crate::token::{decode_token, millis_to_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier as sent by the API, which uses both numeric and string ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// User fields returned by the login endpoint.
///
/// Only a handful of fields are known; everything else lands in `extra` and
/// is carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Parse the JSON stored in the `user_data` cookie
    pub fn from_json(raw: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// An authenticated session.
///
/// Constructing one validates the token shape and extracts its expiry, so a
/// `Session` value always carries a decodable token with an `exp` claim. It
/// may still be expired; callers check against their clock.
#[derive(Clone, PartialEq)]
pub struct Session {
    token: String,
    role: Role,
    user: UserProfile,
    expires_at_ms: i64,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, user: UserProfile) -> SessionResult<Self> {
        let token = token.into();
        let claims = decode_token(&token)
            .ok_or_else(|| SessionError::malformed("token payload could not be decoded"))?;
        let expires_at_ms = claims
            .expires_at_millis()
            .ok_or_else(|| SessionError::malformed("token has no exp claim"))?;

        Ok(Self {
            token,
            role,
            user,
            expires_at_ms,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Expiry, clamped to the representable range
    pub fn expires_at(&self) -> DateTime<Utc> {
        millis_to_datetime(self.expires_at_ms)
    }

    /// Same millisecond rule as [`crate::token::is_token_expired`]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_ms < now.timestamp_millis()
    }

    /// Token-free projection for responses and logs
    pub fn view(&self) -> SessionView {
        SessionView {
            role: self.role,
            user: self.user.clone(),
            expires_at: self.expires_at(),
        }
    }
}

// The token never shows up in debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("user", &self.user)
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}

/// Public view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub role: Role,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}
