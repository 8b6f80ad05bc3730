//! Session persistence adapters.
//!
//! The store keeps its in-memory state separate from wherever the session is
//! written (browser cookies, a request's cookie jar, memory in tests). An
//! adapter only moves three raw strings around; parsing and validation stay
//! in [`crate::store::SessionStore`].

use crate::error::SessionResult;
use crate::session::Session;
use std::sync::{Mutex, PoisonError};

/// Raw persisted values, exactly as found in storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub role: Option<String>,
    pub user_data: Option<String>,
}

impl StoredSession {
    /// Nothing persisted at all
    pub const fn is_empty(&self) -> bool {
        self.token.is_none() && self.role.is_none() && self.user_data.is_none()
    }
}

/// Storage backend for the session's three values
pub trait SessionPersistence: Send + Sync {
    /// Read whatever is currently stored
    fn load(&self) -> StoredSession;

    /// Write token, role and user data
    fn save(&self, session: &Session) -> SessionResult<()>;

    /// Remove all three values; must be idempotent
    fn clear(&self);
}

/// Process-local persistence
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    stored: Mutex<StoredSession>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing values, as if left over from a previous run
    pub fn with_stored(stored: StoredSession) -> Self {
        Self {
            stored: Mutex::new(stored),
        }
    }
}

impl SessionPersistence for InMemoryPersistence {
    fn load(&self) -> StoredSession {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: &Session) -> SessionResult<()> {
        let user_data = session.user().to_json()?;
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = StoredSession {
            token: Some(session.token().to_string()),
            role: Some(session.role().as_str().to_string()),
            user_data: Some(user_data),
        };
        Ok(())
    }

    fn clear(&self) {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = StoredSession::default();
    }
}
