//! Client-side session provider and route guard

use crate::error::SessionResult;
use crate::role::Role;
use crate::routes::{RouteDecision, RouteTable};
use crate::session::{Session, UserProfile};
use crate::store::{SessionStatus, SessionStore};
use crate::watcher::{DEFAULT_CHECK_INTERVAL, ExpiryWatcher};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Owns the session store and its expiry watcher.
///
/// A watcher runs exactly while a session exists. Dropping the provider
/// cancels it.
#[derive(Debug)]
pub struct SessionProvider {
    store: Arc<SessionStore>,
    check_interval: Duration,
    watcher: Mutex<Option<ExpiryWatcher>>,
}

impl SessionProvider {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self::with_check_interval(store, DEFAULT_CHECK_INTERVAL)
    }

    pub fn with_check_interval(store: Arc<SessionStore>, check_interval: Duration) -> Self {
        Self {
            store,
            check_interval,
            watcher: Mutex::new(None),
        }
    }

    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Read persisted state, starting the watcher if a session came back.
    /// Must run inside a tokio runtime.
    pub fn restore(&self) -> Option<Session> {
        let session = self.store.restore();
        if session.is_some() {
            self.start_watcher();
        }
        session
    }

    /// Log in and start watching the new session's expiry.
    /// Must run inside a tokio runtime.
    pub fn login(
        &self,
        token: impl Into<String>,
        role: Role,
        user: UserProfile,
    ) -> SessionResult<Session> {
        let session = self.store.login(token, role, user)?;
        self.start_watcher();
        Ok(session)
    }

    pub fn logout(&self) {
        self.store.logout();
        self.stop_watcher();
    }

    /// The API answered 401: the session is no longer accepted
    pub fn handle_unauthorized(&self) {
        debug!("API rejected the session, logging out");
        self.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Whether an expiry watcher is currently running
    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|w| !w.is_finished())
    }

    fn start_watcher(&self) {
        let watcher = ExpiryWatcher::spawn(self.store.clone(), self.check_interval);
        // Replacing the previous watcher drops, and so cancels, it.
        *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(watcher);
    }

    fn stop_watcher(&self) {
        if let Some(watcher) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            watcher.cancel();
        }
    }
}

/// Where the redirector stands for the current path and session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Loading,
    Unauthenticated,
    AuthenticatedOnLoginPage,
    AuthenticatedWrongRole,
    AuthenticatedOk,
}

/// What the UI should do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session check still running, render nothing yet
    Wait,
    Render,
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOutcome {
    pub state: GuardState,
    pub decision: GuardDecision,
}

/// Route redirector evaluated on every path or session change
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: Arc<RouteTable>,
    fallback: String,
}

impl RouteGuard {
    pub fn new(table: Arc<RouteTable>, fallback: impl Into<String>) -> Self {
        Self {
            table,
            fallback: fallback.into(),
        }
    }

    pub fn evaluate(&self, path: &str, status: SessionStatus) -> GuardOutcome {
        let principal = match status {
            SessionStatus::Loading => {
                return GuardOutcome {
                    state: GuardState::Loading,
                    decision: GuardDecision::Wait,
                };
            }
            SessionStatus::Anonymous => None,
            SessionStatus::Authenticated(role) => Some(role),
        };

        let decision = self.table.decide(path, principal, &self.fallback);
        let state = match (principal, &decision) {
            (None, _) => GuardState::Unauthenticated,
            (Some(_), RouteDecision::Allow) => GuardState::AuthenticatedOk,
            (Some(_), RouteDecision::Redirect(_)) if self.table.is_public(path) => {
                GuardState::AuthenticatedOnLoginPage
            }
            (Some(_), RouteDecision::Redirect(_)) => GuardState::AuthenticatedWrongRole,
        };

        let decision = match decision {
            RouteDecision::Allow => GuardDecision::Render,
            RouteDecision::Redirect(target) => GuardDecision::Redirect(target),
        };
        debug!(path, ?state, ?decision, "Route guard evaluated");

        GuardOutcome { state, decision }
    }

    /// Evaluate against the store's current status
    pub fn evaluate_store(&self, path: &str, store: &SessionStore) -> GuardOutcome {
        self.evaluate(path, store.status())
    }
}
