//! Integration tests for server startup and the edge guard over real HTTP

use chrono::{Duration as ChronoDuration, Utc};
use hrdesk_core::tests::tokens::token_expiring_at;
use hrdesk_daemon::{Server, Settings};
use reqwest::StatusCode;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

/// Create test settings
fn test_settings(static_dir: Option<&std::path::Path>) -> Settings {
    let mut settings = Settings::default();
    settings.server.port = 0;
    settings.server.static_dir = static_dir.map(std::path::Path::to_path_buf);
    settings.session.secure_cookies = false;
    settings
}

/// Helper to start a test server
async fn start_test_server(
    settings: Settings,
) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let server = Server::bind(&settings).await.expect("Failed to bind");
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .run(async {
                let _ = rx.await;
            })
            .await
            .expect("Server failed");
    });

    (addr, tx, handle)
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn valid_token() -> String {
    token_expiring_at((Utc::now() + ChronoDuration::hours(1)).timestamp())
}

#[tokio::test]
async fn test_server_starts_and_responds() {
    let (addr, shutdown, handle) = start_test_server(test_settings(None)).await;
    let client = http_client();

    let response = timeout(
        Duration::from_secs(5),
        client.get(format!("http://{addr}/api/health")).send(),
    )
    .await
    .expect("Request timed out")
    .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());

    shutdown.send(()).unwrap();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("Server did not shut down")
        .unwrap();
}

#[tokio::test]
async fn test_configured_api_reaches_dashboard() {
    let mut settings = test_settings(None);
    settings.api.base_url = "https://api.hrdesk.test".to_string();
    settings.api.timeout_secs = 12;
    settings.session.check_interval_secs = 20;
    let (addr, shutdown, _handle) = start_test_server(settings).await;

    let body: serde_json::Value = http_client()
        .get(format!("http://{addr}/api/config"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["api_base_url"], "https://api.hrdesk.test");
    assert_eq!(body["api_timeout_secs"], 12);
    assert_eq!(body["check_interval_secs"], 20);

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_edge_redirects() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>hrdesk</html>").unwrap();
    let (addr, shutdown, _handle) = start_test_server(test_settings(Some(dir.path()))).await;
    let client = http_client();
    let base_url = format!("http://{addr}");
    let token = valid_token();

    let cases = [
        ("/", None, Some("/login")),
        ("/employees", None, Some("/login")),
        ("/login", None, None),
        ("/", Some("superadmin"), Some("/superadmin")),
        ("/superadmin/branches", Some("admin"), Some("/")),
        ("/login", Some("admin"), Some("/")),
        ("/attendance", Some("admin"), None),
        ("/superadmin", Some("superadmin"), None),
    ];

    for (path, role, expected) in cases {
        let mut request = client.get(format!("{base_url}{path}"));
        if let Some(role) = role {
            request = request.header(COOKIE, format!("token={token}; role={role}"));
        }
        let response = request.send().await.unwrap();

        match expected {
            Some(location) => {
                assert_eq!(
                    response.status(),
                    StatusCode::TEMPORARY_REDIRECT,
                    "{path} {role:?}"
                );
                assert_eq!(response.headers()[LOCATION], location, "{path} {role:?}");
            }
            None => assert_eq!(response.status(), StatusCode::OK, "{path} {role:?}"),
        }
    }

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_login_then_browse() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>hrdesk</html>").unwrap();
    let (addr, shutdown, _handle) = start_test_server(test_settings(Some(dir.path()))).await;
    let client = http_client();
    let base_url = format!("http://{addr}");

    let response = client
        .post(format!("{base_url}/api/session"))
        .json(&json!({
            "token": valid_token(),
            "role": "admin",
            "user_data": { "id": 3, "username": "dewi", "branch_id": 1 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Echo the cookies back the way a browser would.
    let cookie_header = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok()?.split(';').next().map(str::to_string))
        .collect::<Vec<_>>()
        .join("; ");

    let response = client
        .get(format!("{base_url}/leaves"))
        .header(COOKIE, &cookie_header)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "<html>hrdesk</html>");

    let response = client
        .get(format!("{base_url}/api/session"))
        .header(COOKIE, &cookie_header)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["username"], "dewi");
    assert_eq!(body["user"]["branch_id"], 1);

    let response = client
        .delete(format!("{base_url}/api/session"))
        .header(COOKIE, &cookie_header)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 3);

    shutdown.send(()).unwrap();
}
