//! Session store
//!
//! Holds the current session in memory and mirrors every change into a
//! [`SessionPersistence`] adapter. All mutations are synchronous; observers
//! (the expiry watcher, UI code) follow changes through [`SessionStore::subscribe`].

use crate::clock::Clock;
use crate::error::{SessionError, SessionResult};
use crate::persistence::{SessionPersistence, StoredSession};
use crate::role::Role;
use crate::session::{Session, UserProfile};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Authentication status as seen by guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Persisted state has not been read yet
    Loading,
    Anonymous,
    Authenticated(Role),
}

impl SessionStatus {
    pub const fn role(self) -> Option<Role> {
        match self {
            Self::Authenticated(role) => Some(role),
            Self::Loading | Self::Anonymous => None,
        }
    }
}

/// In-memory session state with pluggable persistence
pub struct SessionStore {
    persistence: Arc<dyn SessionPersistence>,
    clock: Arc<dyn Clock>,
    session: RwLock<Option<Session>>,
    status: watch::Sender<SessionStatus>,
}

impl SessionStore {
    /// Create a store in the `Loading` state. Call [`Self::restore`] to read
    /// persisted values.
    pub fn new(persistence: Arc<dyn SessionPersistence>, clock: Arc<dyn Clock>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Loading);
        Self {
            persistence,
            clock,
            session: RwLock::new(None),
            status,
        }
    }

    /// Load the session from persistence.
    ///
    /// Only a complete record (token and known role) with an unexpired token
    /// is accepted. Partial or stale values are wiped from persistence.
    pub fn restore(&self) -> Option<Session> {
        let stored = self.persistence.load();
        let restored = if stored.is_empty() {
            None
        } else {
            match self.session_from_stored(stored) {
                Ok(session) => Some(session),
                Err(e) => {
                    debug!("Discarding persisted session: {}", e);
                    self.persistence.clear();
                    None
                }
            }
        };

        let mut current = self.write();
        *current = restored.clone();
        self.publish(current.as_ref());
        if let Some(session) = &restored {
            info!(role = %session.role(), "Session restored");
        }
        restored
    }

    fn session_from_stored(&self, stored: StoredSession) -> SessionResult<Session> {
        let (Some(token), Some(role)) = (stored.token, stored.role) else {
            return Err(SessionError::persistence("incomplete session record"));
        };
        let role: Role = role.parse()?;
        let user = match stored.user_data.as_deref().map(UserProfile::from_json) {
            Some(Ok(user)) => user,
            Some(Err(e)) => {
                debug!("Ignoring unreadable user data: {}", e);
                UserProfile::default()
            }
            None => UserProfile::default(),
        };

        let session = Session::new(token, role, user)?;
        if session.is_expired_at(self.clock.now()) {
            return Err(SessionError::TokenExpired {
                expired_at: session.expires_at().to_rfc3339(),
            });
        }
        Ok(session)
    }

    /// Start a session.
    ///
    /// A token that is malformed or already expired is rejected before
    /// anything is written; the store is left exactly as it was.
    pub fn login(
        &self,
        token: impl Into<String>,
        role: Role,
        user: UserProfile,
    ) -> SessionResult<Session> {
        let session = Session::new(token, role, user).inspect_err(|e| {
            error!("Rejected login: {}", e);
        })?;

        if session.is_expired_at(self.clock.now()) {
            let err = SessionError::TokenExpired {
                expired_at: session.expires_at().to_rfc3339(),
            };
            error!("Rejected login: {}", err);
            return Err(err);
        }

        let mut current = self.write();
        if let Err(e) = self.persistence.save(&session) {
            error!("Failed to persist session: {}", e);
            self.persistence.clear();
            return Err(e);
        }
        *current = Some(session.clone());
        self.publish(current.as_ref());

        info!(role = %role, expires_at = %session.expires_at(), "Session started");
        Ok(session)
    }

    /// End the session. Safe to call at any time.
    pub fn logout(&self) {
        let mut current = self.write();
        self.persistence.clear();
        if let Some(session) = current.take() {
            info!(role = %session.role(), "Session ended");
        }
        self.publish(None);
    }

    /// Re-check expiry against the clock, clearing an expired session.
    ///
    /// Returns whether a valid session remains.
    pub fn validate(&self) -> bool {
        let now = self.clock.now();
        let mut current = self.write();
        match current.as_ref() {
            None => false,
            Some(session) if session.is_expired_at(now) => {
                warn!(
                    role = %session.role(),
                    expired_at = %session.expires_at(),
                    "Session expired, logging out"
                );
                *current = None;
                self.persistence.clear();
                self.publish(None);
                false
            }
            Some(_) => true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(Option::is_some)
    }

    pub fn current(&self) -> Option<Session> {
        self.read(Clone::clone)
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Option<String> {
        self.read(|session| session.as_ref().map(|s| s.token().to_string()))
    }

    pub fn role(&self) -> Option<Role> {
        self.read(|session| session.as_ref().map(Session::role))
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Follow status changes
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    fn read<R>(&self, f: impl FnOnce(&Option<Session>) -> R) -> R {
        f(&self.session.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: Option<&Session>) {
        let status = session.map_or(SessionStatus::Anonymous, |s| {
            SessionStatus::Authenticated(s.role())
        });
        self.status.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        });
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
