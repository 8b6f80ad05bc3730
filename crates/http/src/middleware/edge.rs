//! Edge guard middleware
//!
//! Runs on every request before routing. Uses only the request path and the
//! session cookies; no handler code runs for a request that is redirected.

use crate::cookies::{ROLE_COOKIE, TOKEN_COOKIE, clear_session_cookies, parse_cookie_header};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hrdesk_core::{EdgeDecision, EdgeRequest};

/// Middleware function applying the edge guard
pub async fn edge_guard_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if hrdesk_core::EdgeGuard::is_exempt(path) {
        return next.run(req).await;
    }

    let cookies = parse_cookie_header(req.headers());
    let decision = state.edge.evaluate(&EdgeRequest {
        path,
        token: cookies.get(TOKEN_COOKIE).map(String::as_str),
        role: cookies.get(ROLE_COOKIE).map(String::as_str),
    });

    match decision {
        EdgeDecision::Pass => next.run(req).await,
        EdgeDecision::Redirect {
            location,
            clear_session,
        } => {
            debug!(
                path = %req.uri().path(),
                location = %location,
                clear_session,
                "Edge guard redirect"
            );
            redirect(&location, clear_session)
        }
    }
}

fn redirect(location: &str, clear_session: bool) -> Response {
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
        }
        Err(e) => {
            error!("Invalid redirect target {:?}: {}", location, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    if clear_session {
        clear_session_cookies(response.headers_mut());
    }
    response
}
