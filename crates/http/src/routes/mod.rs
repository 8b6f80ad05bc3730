//! API route definitions

use crate::state::AppState;
use axum::{Router, routing::get};

pub mod config;
pub mod health;
pub mod session;

/// Routes mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/session",
            get(session::current)
                .post(session::login)
                .delete(session::logout),
        )
        .route("/session/route", get(session::route_check))
        .route("/config", get(config::client_config))
        .route("/health", get(health::health_check))
}
