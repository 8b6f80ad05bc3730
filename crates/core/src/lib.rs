//! Session guard core for the HR administration dashboard.
//!
//! Tokens are decoded locally and never signature-checked; the API that
//! issued them remains the authority. Everything here only decides what the
//! dashboard shows and where it redirects.

pub mod clock;
pub mod edge;
pub mod error;
pub mod guard;
pub mod persistence;
pub mod role;
pub mod routes;
pub mod session;
pub mod store;
pub mod token;
pub mod watcher;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use clock::{Clock, SystemClock};
pub use edge::{EdgeDecision, EdgeGuard, EdgeRequest};
pub use error::{SessionError, SessionResult};
pub use guard::{GuardDecision, GuardOutcome, GuardState, RouteGuard, SessionProvider};
pub use persistence::{InMemoryPersistence, SessionPersistence, StoredSession};
pub use role::Role;
pub use routes::{PathPattern, RedirectPolicy, RouteDecision, RouteRule, RouteTable};
pub use session::{RecordId, Session, SessionView, UserProfile};
pub use store::{SessionStatus, SessionStore};
pub use token::{TokenClaims, decode_token, is_token_expired, token_expiry};
pub use watcher::{DEFAULT_CHECK_INTERVAL, ExpiryWatcher};
