//! Session lifecycle management.
//!
//! The `SessionManager` owns the authenticated-or-not state of the process:
//! it restores a persisted token at startup, exchanges credentials for new
//! tokens, keeps durable storage and in-memory state in step, and runs a
//! periodic background check that the stored token is still honored by the
//! server.
//!
//! All state mutation happens through `&mut self` on the UI task. Background
//! work (revalidation, the post-registration redirect delay) communicates
//! through an mpsc channel that the UI loop drains via [`poll_events`], so
//! there is a single writer and no mutation race between a user-initiated
//! login and an in-flight revalidation pass.
//!
//! [`poll_events`]: SessionManager::poll_events

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::User;

use super::store::TokenStore;

/// How often the stored token is revalidated against the server, in seconds.
/// This is a best-effort consistency check, not expiry enforcement.
const REVALIDATION_INTERVAL_SECS: u64 = 300;

/// Delay between a successful registration and the switch to the login view,
/// long enough for the success message to be read.
const REGISTER_REDIRECT_DELAY_SECS: u64 = 2;

/// Buffer size for the session event channel.
const EVENT_CHANNEL_SIZE: usize = 8;

/// Failures surfaced to views. Transport errors and application-level
/// rejections are collapsed; the underlying cause is logged, not propagated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Login failed")]
    AuthenticationFailed,

    #[error("Registration failed")]
    RegistrationFailed,

    #[error("Password update failed")]
    UpdateFailed,

    #[error("Session is no longer valid")]
    SessionInvalid,
}

/// Events produced outside the caller's control flow: the periodic
/// revalidation task and the delayed post-registration redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Revalidation confirmed the stored token; carries the server identity.
    Revalidated(User),
    /// Revalidation found the stored token missing or rejected. Carries the
    /// token snapshot the pass was computed against so a verdict about an
    /// old token cannot be applied to a session established afterwards.
    Invalidated { token: Option<String> },
    /// Registration succeeded; the UI should switch to the login view.
    RegistrationComplete,
}

pub struct SessionManager {
    api: ApiClient,
    store: TokenStore,
    token: Option<String>,
    user: Option<User>,
    loading: bool,
    last_revalidated: Option<DateTime<Utc>>,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    revalidation: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: TokenStore) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        Self {
            api,
            store,
            token: None,
            user: None,
            loading: true,
            last_revalidated: None,
            events_tx,
            events_rx,
            revalidation: None,
        }
    }

    // ===== State accessors =====

    /// Authenticated iff a token is held; the token is the source of truth.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True only until the initial restoration attempt has resolved.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// When the background check last confirmed the token, if ever.
    pub fn last_revalidated(&self) -> Option<DateTime<Utc>> {
        self.last_revalidated
    }

    // ===== Lifecycle =====

    /// Restore a persisted session and start the periodic revalidation task.
    ///
    /// The stored token is trusted immediately; the first revalidation pass
    /// (which fires right away) confirms or revokes it. `loading` transitions
    /// to false exactly once, so repeated calls are no-ops.
    pub fn restore(&mut self) {
        if !self.loading {
            return;
        }

        match self.store.load() {
            Ok(Some(saved)) => {
                info!(username = %saved.username, "restored persisted session");
                self.user = Some(User {
                    username: saved.username,
                });
                self.token = Some(saved.token);
            }
            Ok(None) => {
                debug!("no persisted session found");
            }
            Err(e) => {
                warn!(error = %e, "could not read persisted session");
                // Unreadable storage is treated the same as no session.
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "could not clear unreadable session");
                }
            }
        }

        self.loading = false;
        self.spawn_revalidation();
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is persisted before the in-memory state is
    /// updated, and both are complete before this returns, so a caller that
    /// observes `Ok` sees storage and memory agreeing. No bearer credential
    /// is attached to the request itself.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let token = match self.api.login(username, password).await {
            Ok(token) if !token.is_empty() => token,
            Ok(_) => {
                warn!("login response contained no token");
                return Err(SessionError::AuthenticationFailed);
            }
            Err(e) => {
                warn!(error = %e, "login request failed");
                return Err(SessionError::AuthenticationFailed);
            }
        };

        if let Err(e) = self.store.save(&token, username) {
            warn!(error = %e, "could not persist session");
            return Err(SessionError::AuthenticationFailed);
        }

        self.token = Some(token);
        self.user = Some(User {
            username: username.to_string(),
        });
        info!(username, "login succeeded");
        Ok(())
    }

    /// Create an account. Deliberately does not authenticate: any token the
    /// server returned is discarded and nothing is persisted. A delayed
    /// `RegistrationComplete` event tells the UI to switch to the login view
    /// once the success message has been visible for a moment.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        if let Err(e) = self.api.register(username, password).await {
            warn!(error = %e, "registration request failed");
            return Err(SessionError::RegistrationFailed);
        }

        info!(username, "registration succeeded");
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(REGISTER_REDIRECT_DELAY_SECS)).await;
            let _ = tx.send(SessionEvent::RegistrationComplete).await;
        });
        Ok(())
    }

    /// Clear persisted and in-memory session state. Never fails and is
    /// idempotent; storage errors are logged and swallowed.
    pub fn logout(&mut self) {
        if self.token.is_some() {
            info!("logging out");
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear stored session");
        }
        self.token = None;
        self.user = None;
    }

    /// Change the account password. Requires a held token, which stays valid
    /// regardless of the outcome.
    pub async fn update_password(
        &mut self,
        current: &str,
        new: &str,
    ) -> Result<(), SessionError> {
        let token = self.token.as_deref().ok_or(SessionError::SessionInvalid)?;

        match self.api.update_password(token, current, new).await {
            Ok(()) => {
                info!("password updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "password update failed");
                Err(SessionError::UpdateFailed)
            }
        }
    }

    // ===== Background events =====

    /// Drain pending background events, applying their state transitions.
    /// Returns the drained events so the caller can re-run route decisions
    /// and update view-level messaging.
    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(&event);
            events.push(event);
        }
        events
    }

    fn apply_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Revalidated(user) => {
                self.last_revalidated = Some(Utc::now());
                // Identity refresh only makes sense while a session is held;
                // a logout may have raced the revalidation pass.
                if self.token.is_some() {
                    self.user = Some(user.clone());
                }
            }
            SessionEvent::Invalidated { token } => {
                // A verdict about a token we no longer hold is stale: a pass
                // that sampled storage before a login must not wipe the
                // session that login just established.
                if *token != self.token {
                    debug!("dropping stale invalidation verdict");
                    return;
                }
                if self.token.is_some() {
                    info!("stored session is no longer valid");
                }
                self.logout();
            }
            SessionEvent::RegistrationComplete => {}
        }
    }

    /// Spawn the periodic revalidation task. Each pass reads the current
    /// storage snapshot and checks the token against `GET /user`; passes
    /// never overlap because they run sequentially in one task. The first
    /// pass fires immediately to validate a freshly restored token.
    fn spawn_revalidation(&mut self) {
        let api = self.api.clone();
        let store = self.store.clone();
        let tx = self.events_tx.clone();

        let handle = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(REVALIDATION_INTERVAL_SECS));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let event = match store.load() {
                    Ok(Some(saved)) => match api.fetch_current_user(&saved.token).await {
                        Ok(user) => {
                            debug!(username = %user.username, "revalidation confirmed token");
                            SessionEvent::Revalidated(user)
                        }
                        Err(e) => {
                            debug!(error = %e, "revalidation rejected token");
                            SessionEvent::Invalidated {
                                token: Some(saved.token),
                            }
                        }
                    },
                    Ok(None) => SessionEvent::Invalidated { token: None },
                    Err(e) => {
                        warn!(error = %e, "revalidation could not read stored session");
                        SessionEvent::Invalidated { token: None }
                    }
                };

                if tx.send(event).await.is_err() {
                    // Receiver gone: the manager is being torn down.
                    return;
                }
            }
        });

        self.revalidation = Some(handle);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // take() guarantees the timer is cancelled exactly once.
        if let Some(handle) = self.revalidation.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::TokenStore;

    fn temp_store(name: &str) -> TokenStore {
        let dir = std::env::temp_dir().join(format!(
            "pixelport-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        TokenStore::new(dir)
    }

    // Port 9 (discard) is not listened on; requests fail fast.
    fn manager(name: &str) -> SessionManager {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        SessionManager::new(api, temp_store(name))
    }

    #[tokio::test]
    async fn restore_with_empty_storage_stays_unauthenticated() {
        let mut session = manager("restore-empty");
        assert!(session.is_loading());

        session.restore();

        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn restore_with_stored_token_authenticates() {
        let mut session = manager("restore-token");
        session.store.save("t1", "alice").unwrap();

        session.restore();

        assert!(!session.is_loading());
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t1"));
        assert_eq!(session.username(), Some("alice"));
    }

    #[tokio::test]
    async fn loading_transitions_exactly_once() {
        let mut session = manager("loading-once");
        session.store.save("t1", "alice").unwrap();
        session.restore();
        assert!(!session.is_loading());

        // A second restore must not re-read storage or re-enter loading.
        session.store.clear().unwrap();
        session.restore();
        assert!(!session.is_loading());
        assert_eq!(session.token(), Some("t1"));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let mut session = manager("logout-idempotent");
        session.store.save("t1", "alice").unwrap();
        session.restore();

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.store.load().unwrap().is_none());

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_state_unauthenticated() {
        let mut session = manager("login-failure");
        session.restore();

        let result = session.login("alice", "pw").await;

        assert_eq!(result, Err(SessionError::AuthenticationFailed));
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn invalidated_event_matches_logout() {
        let mut session = manager("invalidated");
        session.store.save("t1", "alice").unwrap();
        session.restore();
        assert!(session.is_authenticated());

        session.apply_event(&SessionEvent::Invalidated {
            token: Some("t1".to_string()),
        });

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_invalidation_does_not_wipe_a_newer_session() {
        let mut session = manager("stale-invalidation");
        session.restore();

        // A revalidation pass that sampled empty storage, then a login that
        // completed before the verdict was applied.
        let stale = SessionEvent::Invalidated { token: None };
        session.store.save("t2", "alice").unwrap();
        session.token = Some("t2".to_string());
        session.user = Some(User {
            username: "alice".to_string(),
        });

        session.apply_event(&stale);

        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t2"));
        let saved = session.store.load().unwrap().expect("storage kept");
        assert_eq!(saved.token, "t2");

        // A verdict about the old token is equally stale.
        session.apply_event(&SessionEvent::Invalidated {
            token: Some("t1".to_string()),
        });
        assert!(session.is_authenticated());

        // A verdict about the held token still applies.
        session.apply_event(&SessionEvent::Invalidated {
            token: Some("t2".to_string()),
        });
        assert!(!session.is_authenticated());
        assert!(session.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn revalidated_event_refreshes_identity() {
        let mut session = manager("revalidated");
        session.store.save("t1", "alice").unwrap();
        session.restore();

        session.apply_event(&SessionEvent::Revalidated(User {
            username: "alice".to_string(),
        }));

        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("alice"));
        assert!(session.last_revalidated().is_some());
    }

    #[tokio::test]
    async fn revalidated_event_is_ignored_without_a_session() {
        let mut session = manager("revalidated-loggedout");
        session.restore();

        session.apply_event(&SessionEvent::Revalidated(User {
            username: "alice".to_string(),
        }));

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn update_password_requires_a_session() {
        let mut session = manager("update-password");
        session.restore();

        let result = session.update_password("old", "new").await;
        assert_eq!(result, Err(SessionError::SessionInvalid));
    }
}
