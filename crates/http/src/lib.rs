//! hrdesk HTTP layer
//!
//! Cookie persistence for the session store, the edge guard middleware, the
//! session and health endpoints, router assembly, and the client for the
//! external REST API.

#[cfg(feature = "server")]
#[macro_use]
extern crate tracing;

pub mod cookies;
pub mod error;

#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod state;

#[cfg(feature = "client")]
pub mod client;

pub use cookies::{CookieJar, CookiePolicy};
pub use error::{HttpError, Result};

#[cfg(feature = "server")]
pub use routes::config::ClientConfig;
#[cfg(feature = "server")]
pub use server::build_router;
#[cfg(feature = "server")]
pub use state::AppState;

#[cfg(feature = "client")]
pub use client::{ApiClient, ClientError};
