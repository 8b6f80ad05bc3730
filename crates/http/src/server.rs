//! Router assembly
//!
//! Everything a request can reach sits behind the edge guard: the `/api`
//! routes (which the guard exempts) and the static front-end bundle, served
//! with an `index.html` fallback so client-side routes resolve. Paths the
//! guard exempts never fall back to `index.html`; a missing asset is a bare
//! 404.

use crate::middleware::edge_guard_middleware;
use crate::routes;
use crate::state::AppState;
use axum::Router;
use axum::extract::Request;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use hrdesk_core::EdgeGuard;
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

const INDEX_FILE: &str = "index.html";

/// Build the application router
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new().nest("/api", routes::router());

    if let Some(static_dir) = static_dir {
        if static_dir.is_dir() {
            let index_path = static_dir.join(INDEX_FILE);
            debug!(
                "Serving static files from {} (index exists: {})",
                static_dir.display(),
                index_path.exists()
            );
            let index = ServeFile::new(index_path);
            let app_shell = move |req: Request| {
                let index = index.clone();
                async move {
                    if EdgeGuard::is_exempt(req.uri().path()) {
                        return StatusCode::NOT_FOUND.into_response();
                    }
                    index.oneshot(req).await.into_response()
                }
            };
            let serve_dir = ServeDir::new(static_dir).fallback(app_shell.into_service());
            router = router.fallback_service(serve_dir);
        } else {
            warn!(
                "Static directory '{}' does not exist, skipping static file serving",
                static_dir.display()
            );
        }
    }

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            edge_guard_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::CookiePolicy;
    use axum::body::{Body, to_bytes};
    use axum::http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    };
    use chrono::{Duration, Utc};
    use hrdesk_core::tests::tokens::token_expiring_at;
    use hrdesk_core::{RedirectPolicy, RouteTable};
    use serde_json::{Value, json};

    fn state() -> AppState {
        AppState::new(
            RouteTable::default(),
            RedirectPolicy::default(),
            CookiePolicy { secure: false },
        )
    }

    fn valid_token() -> String {
        token_expiring_at((Utc::now() + Duration::hours(1)).timestamp())
    }

    fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookies(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = build_router(state(), None)
            .oneshot(get("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let state = state().with_client_config(crate::routes::config::ClientConfig {
            api_base_url: "https://api.hrdesk.test".to_string(),
            api_timeout_secs: 15,
            check_interval_secs: 30,
        });
        let response = build_router(state, None)
            .oneshot(get("/api/config", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "api_base_url": "https://api.hrdesk.test",
                "api_timeout_secs": 15,
                "check_interval_secs": 30,
                "login_path": "/login",
                "unauthorized_path": "/unauthorized"
            })
        );
    }

    #[tokio::test]
    async fn test_login_sets_cookies() {
        let token = valid_token();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/session")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "token": token,
                    "role": "superadmin",
                    "user_data": { "id": 7, "username": "rina", "branch_id": null }
                })
                .to_string(),
            ))
            .unwrap();

        let response = build_router(state(), None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().any(|c| c.starts_with("role=superadmin;")));
        assert!(cookies.iter().all(|c| c.contains("SameSite=Strict")));

        let body = body_json(response).await;
        assert_eq!(body["role"], "superadmin");
        assert_eq!(body["user"]["username"], "rina");
    }

    #[tokio::test]
    async fn test_login_rejects_expired_and_unknown_role() {
        let expired = token_expiring_at((Utc::now() - Duration::minutes(5)).timestamp());
        for (token, role, status) in [
            (expired, "admin", StatusCode::UNAUTHORIZED),
            ("not-a-jwt".to_string(), "admin", StatusCode::UNAUTHORIZED),
            (valid_token(), "employee", StatusCode::BAD_REQUEST),
        ] {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/session")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "token": token, "role": role }).to_string()))
                .unwrap();

            let response = build_router(state(), None).oneshot(request).await.unwrap();
            assert_eq!(response.status(), status, "{role}");
            assert!(set_cookies(&response).is_empty());
        }
    }

    #[tokio::test]
    async fn test_current_session() {
        let cookie = format!(
            "token={}; role=admin; user_data=%7B%22username%22%3A%22budi%22%7D",
            valid_token()
        );
        let response = build_router(state(), None)
            .oneshot(get("/api/session", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "admin");
        assert_eq!(body["user"]["username"], "budi");

        let stale = format!(
            "token={}; role=admin",
            token_expiring_at((Utc::now() - Duration::hours(1)).timestamp())
        );
        let response = build_router(state(), None)
            .oneshot(get("/api/session", Some(&stale)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(set_cookies(&response).len(), 3);
    }

    #[tokio::test]
    async fn test_logout_clears_cookies() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/session")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state(), None).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_route_check_uses_client_fallback() {
        let cookie = format!("token={}; role=admin", valid_token());
        let response = build_router(state(), None)
            .oneshot(get("/api/session/route?path=/superadmin/branches", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({
                "state": "authenticated_wrong_role",
                "decision": { "action": "redirect", "target": "/unauthorized" }
            })
        );

        let response = build_router(state(), None)
            .oneshot(get("/api/session/route?path=/", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["state"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_static_pages_behind_edge_guard() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>hrdesk</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let app = build_router(state(), Some(dir.path()));

        let response = app.clone().oneshot(get("/employees", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/login");

        let response = app.clone().oneshot(get("/app.js", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.clone().oneshot(get("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = format!("token={}; role=admin", valid_token());
        let response = app
            .oneshot(get("/employees", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>hrdesk</html>");
    }

    #[tokio::test]
    async fn test_missing_assets_never_serve_app_shell() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>hrdesk</html>").unwrap();
        let app = build_router(state(), Some(dir.path()));

        for path in [
            "/superadmin/branches.txt",
            "/employees/list.js",
            "/static/missing.css",
            "/api/unknown",
        ] {
            let response = app.clone().oneshot(get(path, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty(), "{path} served {bytes:?}");
        }
    }
}
