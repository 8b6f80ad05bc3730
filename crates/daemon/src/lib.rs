//! hrdesk daemon: configuration, logging and the HTTP server process

pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use config::Settings;
pub use error::{DaemonError, Result};
pub use server::Server;
