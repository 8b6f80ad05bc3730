//! Runtime settings the dashboard reads at startup

use crate::state::AppState;
use axum::{extract::State, response::Json};
use hrdesk_core::DEFAULT_CHECK_INTERVAL;
use serde::{Deserialize, Serialize};

/// Settings handed to the front-end as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the external REST API
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    /// Seconds between session expiry checks
    pub check_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_timeout_secs: 30,
            check_interval_secs: DEFAULT_CHECK_INTERVAL.as_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub client: ClientConfig,
    pub login_path: String,
    /// Where the client guard sends a role that may not see a page
    pub unauthorized_path: String,
}

/// `GET /api/config`
pub async fn client_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        client: state.client.clone(),
        login_path: state.routes.login_path().to_string(),
        unauthorized_path: state.redirects.client_fallback.clone(),
    })
}
