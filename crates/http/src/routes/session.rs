//! Session endpoints
//!
//! `POST /api/session` turns a login response from the external API into the
//! three session cookies, `DELETE /api/session` clears them, `GET
//! /api/session` reports what the cookies currently amount to, and
//! `GET /api/session/route` runs the client route guard for a path.

use crate::cookies::CookieJar;
use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hrdesk_core::{GuardOutcome, Role, RouteGuard, SessionView, UserProfile};
use serde::Deserialize;
use std::sync::Arc;

/// Login payload: the token, role and user object returned by the API
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
    pub role: String,
    #[serde(default)]
    pub user_data: UserProfile,
}

/// Start a session
#[instrument(name = "session_login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, HttpError> {
    let role: Role = request.role.parse()?;

    let jar = Arc::new(CookieJar::from_headers(&headers, state.cookies));
    let store = state.request_store(jar.clone());
    let session = store.login(request.token, role, request.user_data)?;

    let mut response = Json(session.view()).into_response();
    jar.apply_to(response.headers_mut());
    Ok(response)
}

/// End the session. Always succeeds.
#[instrument(name = "session_logout", skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let jar = Arc::new(CookieJar::from_headers(&headers, state.cookies));
    state.request_store(jar.clone()).logout();

    let mut response = StatusCode::NO_CONTENT.into_response();
    jar.apply_to(response.headers_mut());
    response
}

/// Current session as restored from the request cookies
#[instrument(name = "session_current", skip_all)]
pub async fn current(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let jar = Arc::new(CookieJar::from_headers(&headers, state.cookies));
    let store = state.request_store(jar.clone());

    if let Some(session) = store.restore() {
        return Json::<SessionView>(session.view()).into_response();
    }

    // restore() has already expired any stale or partial cookies
    let mut response =
        HttpError::AuthenticationFailed("No valid session".to_string()).into_response();
    jar.apply_to(response.headers_mut());
    response
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub path: String,
}

/// Evaluate the client route guard against the request's session
#[instrument(name = "session_route_check", skip_all)]
pub async fn route_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RouteQuery>,
) -> Json<GuardOutcome> {
    let jar = Arc::new(CookieJar::from_headers(&headers, state.cookies));
    let store = state.request_store(jar);
    store.restore();

    let guard = RouteGuard::new(state.routes.clone(), state.redirects.client_fallback.clone());
    Json(guard.evaluate_store(&query.path, &store))
}
