//! Session controller: owns the session state machine.
//!
//! The controller is the sole writer of session state. It orchestrates
//! login, registration, logout, password resets, and the single-flight
//! token refresh, persisting every change through the injected
//! [`CredentialStore`]. Collaborators (dispatcher, route guard, UI) read
//! snapshots or subscribe to status changes; they never mutate the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use haulog_core::models::session::{Session, SessionStatus, User};
use haulog_core::store::CredentialStore;
use haulog_core::{AuthError, AuthResult};

use crate::backend::AuthBackend;
use crate::models::{
    LoginRequest, PasswordResetConfirm, PasswordResetRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, TokenResponse,
};

/// Minimum accepted password length, matching the backend's own check.
const MIN_PASSWORD_LEN: usize = 8;

/// Orchestrates the session lifecycle over an injected store and backend.
pub struct SessionController {
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn AuthBackend>,
    state: RwLock<Session>,
    /// Serializes refresh attempts (single-flight).
    refresh_gate: Mutex<()>,
    /// Bumped when a refresh attempt completes, either way. Callers that
    /// waited behind the gate use it to adopt the shared outcome instead of
    /// issuing a second backend call.
    refresh_epoch: AtomicU64,
    /// Bumped on logout. A refresh that resolves across a logout discards
    /// its result; logout is authoritative.
    logout_epoch: AtomicU64,
    /// Broadcasts status changes to collaborators (e.g. navigation reacting
    /// to a forced logout).
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionController {
    /// Restores any persisted session from `store` and takes ownership of
    /// session state.
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let restored = store.get();
        if restored.status != SessionStatus::Anonymous {
            let username = restored
                .user
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or("<profile pending>");
            info!(username, status = ?restored.status, "restored persisted session");
        }
        let (status_tx, _) = watch::channel(restored.status);
        Self {
            store,
            backend,
            state: RwLock::new(restored),
            refresh_gate: Mutex::new(()),
            refresh_epoch: AtomicU64::new(0),
            logout_epoch: AtomicU64::new(0),
            status_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only collaborator surface
    // -----------------------------------------------------------------------

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.session().has_role(role)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session().access_token
    }

    /// Subscribe to session status changes. The receiver always reports the
    /// latest status; an `anonymous` transition is the logout/redirect
    /// signal.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Login and registration
    // -----------------------------------------------------------------------

    /// Authenticate with username and password.
    ///
    /// On success the full session is persisted and the status becomes
    /// `authenticated`. On any failure the prior session is left untouched.
    pub async fn login(&self, credentials: LoginRequest) -> AuthResult<Session> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".into(),
            ));
        }

        debug!(username = %credentials.username, "logging in");
        let previous = self.enter_authenticating();
        let outcome = match self.backend.login(&credentials).await {
            Ok(tokens) => self.install(tokens),
            Err(error) => Err(error),
        };
        self.settle_authentication(outcome, previous)
    }

    /// Register a new account. Same session contract as [`Self::login`].
    pub async fn register(&self, form: RegisterRequest) -> AuthResult<Session> {
        Self::validate_registration(&form)?;

        debug!(username = %form.username, "registering");
        let previous = self.enter_authenticating();
        let outcome = match self.backend.register(&form).await {
            Ok(tokens) => self.install(tokens),
            Err(error) => Err(error),
        };
        self.settle_authentication(outcome, previous)
    }

    fn validate_registration(form: &RegisterRequest) -> AuthResult<()> {
        if form.username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".into()));
        }
        if !form.email.contains('@') {
            return Err(AuthError::Validation(
                "A valid email address is required".into(),
            ));
        }
        if form.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if form.password != form.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        Ok(())
    }

    /// Persist and adopt a freshly issued session.
    fn install(&self, tokens: TokenResponse) -> AuthResult<Session> {
        let session = Session::authenticated(tokens.access, tokens.refresh, tokens.user);
        self.store.set(&session)?;
        *self.state_write() = session.clone();
        Ok(session)
    }

    fn enter_authenticating(&self) -> Session {
        let previous = {
            let mut state = self.state_write();
            let previous = state.clone();
            state.status = SessionStatus::Authenticating;
            previous
        };
        self.publish_status();
        previous
    }

    fn settle_authentication(
        &self,
        outcome: AuthResult<Session>,
        previous: Session,
    ) -> AuthResult<Session> {
        let result = match outcome {
            Ok(session) => {
                if let Some(user) = &session.user {
                    info!(username = %user.username, role = %user.role, "session established");
                }
                Ok(session)
            }
            Err(error) => {
                // A failed attempt leaves any prior session untouched.
                *self.state_write() = previous;
                Err(error)
            }
        };
        self.publish_status();
        result
    }

    // -----------------------------------------------------------------------
    // Token refresh
    // -----------------------------------------------------------------------

    /// Obtain a new access token using the stored refresh token.
    ///
    /// Single-flight: concurrent callers serialize behind one in-flight
    /// attempt and adopt its outcome rather than issuing their own backend
    /// call. Backend rejection of the refresh token clears the whole
    /// session; a transport failure leaves it intact with status `expired`.
    pub async fn refresh(&self) -> AuthResult<String> {
        let observed = self.refresh_epoch.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        // A refresh completed while we waited for the gate: its outcome is
        // ours as well.
        if self.refresh_epoch.load(Ordering::Acquire) != observed {
            return self.adopt_refresh_outcome();
        }

        let refresh_token = {
            let mut state = self.state_write();
            let Some(token) = state.refresh_token.clone() else {
                return Err(AuthError::RefreshRejected("no refresh token held".into()));
            };
            state.status = SessionStatus::Refreshing;
            token
        };
        self.publish_status();
        let logout_before = self.logout_epoch.load(Ordering::Acquire);

        debug!("refreshing access token");
        let outcome = self
            .backend
            .refresh(&RefreshRequest {
                refresh: refresh_token,
            })
            .await;

        let result = self.apply_refresh_outcome(outcome, logout_before);
        self.refresh_epoch.fetch_add(1, Ordering::Release);
        self.publish_status();
        result
    }

    /// Derive the outcome of the refresh we waited behind from the state it
    /// left: renewed token, cleared session, or kept-but-stale session.
    fn adopt_refresh_outcome(&self) -> AuthResult<String> {
        let session = self.session();
        match (session.status, session.access_token) {
            (SessionStatus::Authenticated, Some(token)) => Ok(token),
            (SessionStatus::Expired, _) => Err(AuthError::Network(
                "token refresh failed on transport".into(),
            )),
            _ => Err(AuthError::RefreshRejected(
                "session was cleared by a failed refresh".into(),
            )),
        }
    }

    fn apply_refresh_outcome(
        &self,
        outcome: AuthResult<RefreshResponse>,
        logout_before: u64,
    ) -> AuthResult<String> {
        let mut state = self.state_write();

        // Logout is authoritative: discard a result that resolved across one.
        if self.logout_epoch.load(Ordering::Acquire) != logout_before {
            warn!("discarding refresh outcome that resolved after logout");
            return Err(AuthError::RefreshRejected(
                "session was logged out during refresh".into(),
            ));
        }

        match outcome {
            Ok(renewed) => {
                let mut next = state.clone();
                next.access_token = Some(renewed.access.clone());
                next.status = SessionStatus::Authenticated;
                match self.store.set(&next) {
                    Ok(()) => {
                        *state = next;
                        debug!("access token renewed");
                        Ok(renewed.access)
                    }
                    Err(error) => {
                        state.status = SessionStatus::Expired;
                        Err(AuthError::Store(error))
                    }
                }
            }
            // Transport trouble is not fatal: keep the session, the next
            // authorization failure triggers another attempt.
            Err(AuthError::Network(message)) => {
                state.status = SessionStatus::Expired;
                warn!(%message, "token refresh failed on transport; session kept");
                Err(AuthError::Network(message))
            }
            // The backend rejected the refresh token: fatal to the session.
            Err(error) => {
                let cleared = self.store.clear();
                *state = Session::anonymous();
                warn!(%error, "refresh token rejected; session cleared");
                if let Err(store_error) = cleared {
                    return Err(AuthError::Store(store_error));
                }
                Err(AuthError::RefreshRejected(error.to_string()))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Logout
    // -----------------------------------------------------------------------

    /// Clear the session and the persisted credentials. Idempotent.
    ///
    /// Authoritative over any refresh in flight: a result resolving after
    /// this call is discarded. Watchers observe the `anonymous` status and
    /// redirect to the login surface. Returns whether a session was
    /// actually cleared.
    pub fn logout(&self) -> AuthResult<bool> {
        self.logout_epoch.fetch_add(1, Ordering::Release);
        if self.session().status == SessionStatus::Anonymous {
            debug!("logout with no active session");
            return Ok(false);
        }
        self.store.clear()?;
        *self.state_write() = Session::anonymous();
        self.publish_status();
        info!("logged out");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Password reset
    // -----------------------------------------------------------------------

    /// Ask the backend to send a password-reset link. Never touches the
    /// session.
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<String> {
        if !email.contains('@') {
            return Err(AuthError::Validation(
                "A valid email address is required".into(),
            ));
        }
        self.backend
            .request_password_reset(&PasswordResetRequest {
                email: email.to_string(),
            })
            .await
    }

    /// Complete a password reset with the emailed uid and token. Never
    /// touches the session.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> AuthResult<String> {
        if uid.trim().is_empty() || token.trim().is_empty() {
            return Err(AuthError::Validation(
                "Reset uid and token are required".into(),
            ));
        }
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        self.backend
            .confirm_password_reset(&PasswordResetConfirm {
                uid: uid.to_string(),
                token: token.to_string(),
                new_password: new_password.to_string(),
            })
            .await
    }

    // -----------------------------------------------------------------------
    // State plumbing
    // -----------------------------------------------------------------------

    fn state_write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_status(&self) {
        let status = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status;
        self.status_tx.send_replace(status);
    }
}
