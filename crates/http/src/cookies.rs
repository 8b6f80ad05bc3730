//! Session cookies
//!
//! Three cookies carry a session: `token`, `role` and `user_data` (JSON).
//! Values are URL-encoded. They are written with `Path=/; SameSite=Strict`
//! and `Secure`, and cleared by expiring them in the past.

use hrdesk_core::{Session, SessionPersistence, SessionResult, StoredSession};
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "role";
pub const USER_DATA_COOKIE: &str = "user_data";

/// Every cookie that makes up a session
pub const SESSION_COOKIES: [&str; 3] = [TOKEN_COOKIE, ROLE_COOKIE, USER_DATA_COOKIE];

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Attributes applied when writing cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute. Only turn this off for plain-HTTP
    /// development servers.
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Parse every `Cookie` header into name → decoded value.
///
/// Pairs without `=`, with an empty name, or with a value that does not
/// URL-decode are skipped. The first occurrence of a name wins.
pub fn parse_cookie_header(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            if let Ok(decoded) = urlencoding::decode(value) {
                cookies
                    .entry(name.to_string())
                    .or_insert_with(|| decoded.into_owned());
            }
        }
    }

    cookies
}

/// `Set-Cookie` value writing `name`
pub fn set_cookie(name: &str, value: &str, policy: CookiePolicy) -> String {
    let secure = if policy.secure { "; Secure" } else { "" };
    format!(
        "{name}={}; Path=/; SameSite=Strict{secure}",
        urlencoding::encode(value)
    )
}

/// `Set-Cookie` value expiring `name`
pub fn expire_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; Expires={EXPIRED}")
}

/// Append headers expiring all three session cookies
pub fn clear_session_cookies(headers: &mut HeaderMap) {
    for name in SESSION_COOKIES {
        append_set_cookie(headers, &expire_cookie(name));
    }
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => warn!("Dropping unencodable Set-Cookie header: {}", e),
    }
}

#[derive(Debug, Default)]
struct JarState {
    values: HashMap<String, String>,
    pending: Vec<String>,
}

/// Cookie-backed session persistence.
///
/// Holds the cookies a client currently has and records every change as a
/// `Set-Cookie` value, so a request handler can build a jar from the
/// incoming headers, run the session store over it, and copy the changes
/// into its response.
#[derive(Debug, Default)]
pub struct CookieJar {
    policy: CookiePolicy,
    state: Mutex<JarState>,
}

impl CookieJar {
    pub fn new(policy: CookiePolicy) -> Self {
        Self {
            policy,
            state: Mutex::default(),
        }
    }

    /// Jar holding the cookies sent with a request
    pub fn from_headers(headers: &HeaderMap, policy: CookiePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(JarState {
                values: parse_cookie_header(headers),
                pending: Vec::new(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().values.get(name).cloned()
    }

    /// `Set-Cookie` values recorded since the last call
    pub fn take_set_cookies(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().pending)
    }

    /// Move recorded changes into response headers
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for cookie in self.take_set_cookies() {
            append_set_cookie(headers, &cookie);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionPersistence for CookieJar {
    fn load(&self) -> StoredSession {
        let state = self.lock();
        StoredSession {
            token: state.values.get(TOKEN_COOKIE).cloned(),
            role: state.values.get(ROLE_COOKIE).cloned(),
            user_data: state.values.get(USER_DATA_COOKIE).cloned(),
        }
    }

    fn save(&self, session: &Session) -> SessionResult<()> {
        let user_data = session.user().to_json()?;
        let values = [
            (TOKEN_COOKIE, session.token().to_string()),
            (ROLE_COOKIE, session.role().as_str().to_string()),
            (USER_DATA_COOKIE, user_data),
        ];

        let mut state = self.lock();
        for (name, value) in values {
            state.pending.push(set_cookie(name, &value, self.policy));
            state.values.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn clear(&self) {
        let mut state = self.lock();
        for name in SESSION_COOKIES {
            state.values.remove(name);
            state.pending.push(expire_cookie(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_core::tests::tokens::token_expiring_at;
    use hrdesk_core::{Role, UserProfile};

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_parse_cookie_header() {
        let headers = headers_with_cookie(
            "theme=dark; role=superadmin;user_data=%7B%22id%22%3A1%7D; junk; =x; token=\"abc\"",
        );
        let cookies = parse_cookie_header(&headers);

        assert_eq!(cookies["role"], "superadmin");
        assert_eq!(cookies["user_data"], r#"{"id":1}"#);
        assert_eq!(cookies["token"], "abc");
        assert_eq!(cookies["theme"], "dark");
        assert!(!cookies.contains_key("junk"));
        assert!(!cookies.contains_key(""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut headers = headers_with_cookie("role=admin");
        headers.append(COOKIE, HeaderValue::from_static("role=superadmin"));
        assert_eq!(parse_cookie_header(&headers)["role"], "admin");
    }

    #[test]
    fn test_set_and_expire_cookie_attributes() {
        let cookie = set_cookie("user_data", r#"{"name":"a b"}"#, CookiePolicy::default());
        assert_eq!(
            cookie,
            "user_data=%7B%22name%22%3A%22a%20b%22%7D; Path=/; SameSite=Strict; Secure"
        );

        let insecure = set_cookie("role", "admin", CookiePolicy { secure: false });
        assert_eq!(insecure, "role=admin; Path=/; SameSite=Strict");

        let expired = expire_cookie("token");
        assert!(expired.starts_with("token=; Path=/; Max-Age=0"));
        assert!(expired.contains("1970"));
    }

    #[test]
    fn test_clear_session_cookies_appends_three_headers() {
        let mut headers = HeaderMap::new();
        clear_session_cookies(&mut headers);
        let names: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().split('=').next().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["token", "role", "user_data"]);
    }

    #[test]
    fn test_jar_save_load_clear() {
        let jar = CookieJar::new(CookiePolicy::default());
        let token = token_expiring_at(1_900_000_000);
        let user = UserProfile::from_json(r#"{"username":"budi","branch_id":2}"#).unwrap();
        let session = hrdesk_core::Session::new(token.clone(), Role::Admin, user).unwrap();

        jar.save(&session).unwrap();
        let stored = jar.load();
        assert_eq!(stored.token.as_deref(), Some(token.as_str()));
        assert_eq!(stored.role.as_deref(), Some("admin"));
        assert_eq!(jar.take_set_cookies().len(), 3);

        jar.clear();
        jar.clear();
        assert!(jar.load().is_empty());
        let pending = jar.take_set_cookies();
        assert_eq!(pending.len(), 6);
        assert!(pending.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn test_jar_round_trips_through_headers() {
        let jar = CookieJar::new(CookiePolicy::default());
        let token = token_expiring_at(1_900_000_000);
        let user = UserProfile::from_json(r#"{"username":"siti; admin=1"}"#).unwrap();
        let session = hrdesk_core::Session::new(token, Role::Superadmin, user).unwrap();
        jar.save(&session).unwrap();

        // Turn the Set-Cookie values into the Cookie header a browser would send.
        let cookie_header = jar
            .take_set_cookies()
            .iter()
            .map(|c| c.split(';').next().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let incoming = CookieJar::from_headers(
            &headers_with_cookie(&cookie_header),
            CookiePolicy::default(),
        );

        assert_eq!(incoming.load(), jar.load());
        assert_eq!(
            UserProfile::from_json(&incoming.get(USER_DATA_COOKIE).unwrap())
                .unwrap()
                .username
                .as_deref(),
            Some("siti; admin=1")
        );
    }
}
