//! Configuration management for the hrdesk daemon
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML or
//! YAML file, then `HRDESK_`-prefixed environment variables with `__`
//! separating nested keys (`HRDESK_SERVER__PORT=8080`).

use crate::{DaemonError, Result};
use hrdesk_core::{DEFAULT_CHECK_INTERVAL, RedirectPolicy};
use hrdesk_http::{ClientConfig, CookiePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "HRDESK";

/// Main daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Built front-end bundle to serve behind the edge guard
    pub static_dir: Option<PathBuf>,
}

/// Session and redirect behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds between expiry checks of a live session
    pub check_interval_secs: u64,
    pub secure_cookies: bool,
    /// Where the client guard sends a role that may not see a page
    pub client_fallback: String,
    /// Where the edge guard sends a role that may not see a page
    pub edge_fallback: String,
}

/// External REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        let redirects = RedirectPolicy::default();
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL.as_secs(),
            secure_cookies: true,
            client_fallback: redirects.client_fallback,
            edge_fallback: redirects.edge_fallback,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load configuration from an optional file and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value does not parse
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from a file, with environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load using the given environment source
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails or the result is invalid
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings: Self = builder
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values the type system cannot
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::ConfigError` naming the first bad value
    pub fn validate(&self) -> Result<()> {
        for (key, target) in [
            ("session.client_fallback", &self.session.client_fallback),
            ("session.edge_fallback", &self.session.edge_fallback),
        ] {
            if !target.starts_with('/') {
                return Err(DaemonError::ConfigError(format!(
                    "{key} must be an absolute path, got '{target}'"
                )));
            }
        }
        if self.session.check_interval_secs == 0 {
            return Err(DaemonError::ConfigError(
                "session.check_interval_secs must be greater than zero".to_string(),
            ));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(DaemonError::ConfigError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        Ok(())
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        RedirectPolicy {
            client_fallback: self.session.client_fallback.clone(),
            edge_fallback: self.session.edge_fallback.clone(),
        }
    }

    pub const fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            secure: self.session.secure_cookies,
        }
    }

    /// Values the dashboard reads from `/api/config`
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.api.base_url.clone(),
            api_timeout_secs: self.api.timeout_secs,
            check_interval_secs: self.session.check_interval_secs,
        }
    }
}
