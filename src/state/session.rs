//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard and user-aware views to coordinate login redirects
//! and identity-dependent rendering. The store is an explicitly owned context
//! object: consumers receive an `Arc<SessionStore>` instead of reaching for
//! ambient global state.
//!
//! LIFECYCLE
//! =========
//! `anonymous` -> (login) -> `authenticated` -> (logout) -> `anonymous`.
//! A token that survives a restart without its user is `token-only` until
//! [`SessionStore::fetch_current_user`] hydrates or discards it. Failed
//! operations land in `error` with token and user cleared, never in a
//! partially authenticated state.
//!
//! Persistent storage is authoritative for the token. When the API client
//! clears it after a rejected call, the next read of the store drops the
//! in-memory token and user as well.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock};

use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{LoginCredentials, RegisterData, Role, User};
use crate::storage::TokenStorage;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Snapshot of the authentication state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Coarse lifecycle phase derived from a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    TokenOnly,
    Authenticated,
    Error,
}

impl Session {
    /// Token and user are both present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.role() == Some(Role::Manager)
    }

    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.role() == Some(Role::Employee)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// A token is held but the user has not been loaded yet.
    #[must_use]
    pub fn needs_hydration(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.user, &self.error) {
            (Some(_), Some(_), _) => SessionPhase::Authenticated,
            (Some(_), None, _) => SessionPhase::TokenOnly,
            (None, _, Some(_)) => SessionPhase::Error,
            (None, _, None) => SessionPhase::Anonymous,
        }
    }
}

/// Owner of the session and the only writer of the persisted token.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    state: RwLock<Session>,
}

/// Clears the loading flag when dropped, on every exit path.
struct LoadingGuard<'a> {
    state: &'a RwLock<Session>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a RwLock<Session>) -> Self {
        state.write().unwrap_or_else(PoisonError::into_inner).loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).loading = false;
    }
}

fn error_message(err: &ApiError, fallback: &str) -> String {
    err.detail().map_or_else(|| fallback.to_owned(), str::to_owned)
}

impl SessionStore {
    /// Create a store, seeding the token from persistent storage.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn TokenStorage>) -> Self {
        let token = storage.load();
        let state = RwLock::new(Session { token, ..Session::default() });
        Self { api, storage, state }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Clone of the current session.
    pub fn snapshot(&self) -> Session {
        self.read(Clone::clone)
    }

    pub fn user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.read(|s| s.token.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone())
    }

    pub fn loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(Session::is_authenticated)
    }

    pub fn is_manager(&self) -> bool {
        self.read(Session::is_manager)
    }

    pub fn is_employee(&self) -> bool {
        self.read(Session::is_employee)
    }

    pub fn phase(&self) -> SessionPhase {
        self.read(Session::phase)
    }

    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        self.reconcile();
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drop the in-memory token and user once persistent storage no longer
    /// holds that token, e.g. after the API client cleared it on a 401.
    fn reconcile(&self) {
        let held = self.state.read().unwrap_or_else(PoisonError::into_inner).token.clone();
        if held.is_none() || self.storage.load() == held {
            return;
        }
        tracing::info!("persisted token was cleared; dropping session");
        self.write(|s| {
            s.token = None;
            s.user = None;
        });
    }

    fn write<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    // -------------------------------------------------------------------------
    // Token mirroring
    // -------------------------------------------------------------------------

    fn set_token(&self, token: &str) {
        self.storage.store(token);
        self.write(|s| s.token = Some(token.to_owned()));
    }

    fn clear_credentials(&self) {
        self.storage.clear();
        self.write(|s| {
            s.token = None;
            s.user = None;
        });
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Exchange credentials for a token, then load the user's profile.
    ///
    /// Returns `false` and records a message in `error` if either step fails.
    pub async fn login(&self, credentials: &LoginCredentials) -> bool {
        let _loading = LoadingGuard::start(&self.state);
        self.write(|s| s.error = None);

        match self.login_inner(credentials).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = ?user.role, "login succeeded");
                self.write(|s| s.user = Some(user));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.clear_credentials();
                self.write(|s| s.error = Some(error_message(&e, LOGIN_FAILED)));
                false
            }
        }
    }

    async fn login_inner(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        let auth = self.api.login(credentials).await?;
        self.set_token(&auth.access_token);
        self.api.current_user().await
    }

    /// Create an account and log straight into it with the same credentials.
    ///
    /// Returns the result of that login. A failed registration records its
    /// message and skips the login.
    pub async fn register(&self, data: &RegisterData) -> bool {
        let _loading = LoadingGuard::start(&self.state);
        self.write(|s| s.error = None);

        match self.api.register(data).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "registration succeeded; logging in");
                self.login(&data.credentials()).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.write(|s| s.error = Some(error_message(&e, REGISTRATION_FAILED)));
                false
            }
        }
    }

    /// Forget the token, user, and error. No network call.
    pub fn logout(&self) {
        self.clear_credentials();
        self.write(|s| s.error = None);
        tracing::info!("logged out");
    }

    /// Load the user for a held token.
    ///
    /// Returns `false` without a call when no token is held. A failed fetch
    /// discards the token.
    pub async fn fetch_current_user(&self) -> bool {
        if self.token().is_none() {
            return false;
        }
        let _loading = LoadingGuard::start(&self.state);

        match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session hydrated");
                self.write(|s| s.user = Some(user));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "session hydration failed; discarding token");
                self.clear_credentials();
                false
            }
        }
    }

    pub fn clear_error(&self) {
        self.write(|s| s.error = None);
    }
}
