//! Periodic session expiry check

use crate::store::{SessionStatus, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default interval between expiry checks
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Background task re-validating the session's expiry.
///
/// The task ends on its own once the session is gone. Dropping the watcher
/// cancels it.
#[derive(Debug)]
pub struct ExpiryWatcher {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ExpiryWatcher {
    /// Spawn the watcher on the current tokio runtime
    pub fn spawn(store: Arc<SessionStore>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut status = store.subscribe();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!("Expiry watcher cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !store.validate() {
                            debug!("No valid session left, stopping expiry watcher");
                            break;
                        }
                    }
                    changed = status.changed() => {
                        let ended = changed.is_err()
                            || !matches!(*status.borrow_and_update(), SessionStatus::Authenticated(_));
                        if ended {
                            debug!("Session ended, stopping expiry watcher");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the watcher
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the background task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
