//! Request-time guard working from cookies alone.
//!
//! The edge guard sees a path and the raw `token` / `role` cookie values. It
//! applies the same [`RouteTable`] as the client guard, so both layers reach
//! the same allow/deny verdict for every (path, role) pair.

use crate::clock::Clock;
use crate::role::Role;
use crate::routes::{RouteDecision, RouteTable};
use crate::token::is_token_expired;
use std::sync::Arc;

const EXEMPT_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/"];

const STATIC_EXTENSIONS: &[&str] = &[
    "js",
    "css",
    "wasm",
    "map",
    "ico",
    "png",
    "jpg",
    "jpeg",
    "gif",
    "svg",
    "webp",
    "woff",
    "woff2",
    "ttf",
    "txt",
    "webmanifest",
];

/// What the edge guard knows about a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeRequest<'a> {
    pub path: &'a str,
    pub token: Option<&'a str>,
    pub role: Option<&'a str>,
}

/// Verdict for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    Pass,
    Redirect {
        location: String,
        /// Expire the session cookies in the redirect response
        clear_session: bool,
    },
}

impl EdgeDecision {
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Redirect { location, .. } => Some(location),
        }
    }
}

/// Cookie-only route guard
#[derive(Clone)]
pub struct EdgeGuard {
    table: Arc<RouteTable>,
    fallback: String,
    clock: Arc<dyn Clock>,
}

impl EdgeGuard {
    pub fn new(table: Arc<RouteTable>, fallback: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            table,
            fallback: fallback.into(),
            clock,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Paths the guard never looks at: API routes and static assets
    pub fn is_exempt(path: &str) -> bool {
        if path == "/api" || path.starts_with("/api/") || path == "/favicon.ico" {
            return true;
        }
        if EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        Self::is_static_asset(path)
    }

    /// Whether the last path segment carries a static-asset extension.
    ///
    /// Such paths bypass the guard, so whatever serves them must never fall
    /// back to the application shell.
    pub fn is_static_asset(path: &str) -> bool {
        path.rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .is_some_and(|(_, ext)| {
                STATIC_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }

    /// Role of a valid session carried by the cookies, if any.
    ///
    /// Requires both cookies, a known role and an unexpired token.
    pub fn principal(&self, request: &EdgeRequest<'_>) -> Option<Role> {
        let token = request.token.filter(|t| !t.is_empty())?;
        let role = request.role?.parse::<Role>().ok()?;
        if is_token_expired(token, self.clock.now()) {
            return None;
        }
        Some(role)
    }

    pub fn evaluate(&self, request: &EdgeRequest<'_>) -> EdgeDecision {
        if Self::is_exempt(request.path) {
            return EdgeDecision::Pass;
        }

        let principal = self.principal(request);
        match self.table.decide(request.path, principal, &self.fallback) {
            RouteDecision::Allow => EdgeDecision::Pass,
            RouteDecision::Redirect(location) => EdgeDecision::Redirect {
                clear_session: location == self.table.login_path(),
                location,
            },
        }
    }
}

impl std::fmt::Debug for EdgeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeGuard")
            .field("table", &self.table)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
