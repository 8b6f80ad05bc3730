//! HTTP server process

use crate::config::Settings;
use crate::{DaemonError, Result};
use axum::Router;
use hrdesk_core::RouteTable;
use hrdesk_http::{AppState, build_router};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bound listener plus the router it will serve
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Application state for `settings`
    pub fn app_state(settings: &Settings) -> AppState {
        AppState::new(
            RouteTable::default(),
            settings.redirect_policy(),
            settings.cookie_policy(),
        )
        .with_client_config(settings.client_config())
    }

    /// Bind the configured address and assemble the router
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound
    pub async fn bind(settings: &Settings) -> Result<Self> {
        let addr = (settings.server.host.as_str(), settings.server.port);
        let listener = TcpListener::bind(addr).await?;

        if !settings.session.secure_cookies {
            warn!("Session cookies are written without the Secure attribute");
        }
        let router = build_router(
            Self::app_state(settings),
            settings.server.static_dir.as_deref(),
        );

        Ok(Self { listener, router })
    }

    /// Address actually bound
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("HTTP server listening on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| DaemonError::Http(e.to_string()))?;

        info!("HTTP server shutdown complete");
        Ok(())
    }
}
