//! Application state management

use crate::cookies::{CookieJar, CookiePolicy};
use crate::routes::config::ClientConfig;
use hrdesk_core::{Clock, EdgeGuard, RedirectPolicy, RouteTable, SessionStore, SystemClock};
use std::sync::Arc;

/// Shared application state
///
/// Cheap to clone; handlers and the edge middleware each get a copy.
#[derive(Clone)]
pub struct AppState {
    /// Route permission table shared by both guard layers
    pub routes: Arc<RouteTable>,
    /// Per-layer fallback targets
    pub redirects: RedirectPolicy,
    /// Request-time guard
    pub edge: Arc<EdgeGuard>,
    /// Attributes for cookies written by the session endpoints
    pub cookies: CookiePolicy,
    /// Time source for expiry checks
    pub clock: Arc<dyn Clock>,
    /// Served to the dashboard from `/api/config`
    pub client: ClientConfig,
}

impl AppState {
    pub fn new(routes: RouteTable, redirects: RedirectPolicy, cookies: CookiePolicy) -> Self {
        Self::with_clock(routes, redirects, cookies, Arc::new(SystemClock))
    }

    pub fn with_clock(
        routes: RouteTable,
        redirects: RedirectPolicy,
        cookies: CookiePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let routes = Arc::new(routes);
        let edge = Arc::new(EdgeGuard::new(
            routes.clone(),
            redirects.edge_fallback.clone(),
            clock.clone(),
        ));
        Self {
            routes,
            redirects,
            edge,
            cookies,
            clock,
            client: ClientConfig::default(),
        }
    }

    #[must_use]
    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Session store over one request's cookies
    pub fn request_store(&self, jar: Arc<CookieJar>) -> SessionStore {
        SessionStore::new(jar, self.clock.clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            RouteTable::default(),
            RedirectPolicy::default(),
            CookiePolicy::default(),
        )
    }
}
