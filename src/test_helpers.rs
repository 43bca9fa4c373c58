//! Fixtures shared by unit tests across modules.

use std::sync::{Arc, Mutex};

use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{AuthResponse, LoginCredentials, RegisterData, Role, User};
use crate::state::session::SessionStore;
use crate::storage::{MemoryTokenStorage, TokenStorage};

pub fn user(role: Role) -> User {
    User {
        id: 3,
        name: "Sam".to_owned(),
        email: "sam@example.com".to_owned(),
        role,
        manager_id: None,
        created_at: "2024-05-01T10:00:00".to_owned(),
        manager: None,
    }
}

/// Answers `/users/me` with a fixed profile, or 401 when `profile` is `None`.
/// Login and register always fail.
pub struct StubAuthApi {
    pub profile: Option<User>,
    pub profile_calls: Mutex<usize>,
}

impl StubAuthApi {
    pub fn profile_calls(&self) -> usize {
        *self.profile_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl AuthApi for StubAuthApi {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        Err(ApiError::Status { status: 401, detail: Some("Incorrect email or password".to_owned()) })
    }

    async fn register(&self, _data: &RegisterData) -> Result<User, ApiError> {
        Err(ApiError::Status { status: 400, detail: None })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        *self.profile_calls.lock().unwrap() += 1;
        self.profile.clone().ok_or(ApiError::Status { status: 401, detail: None })
    }
}

/// A session store seeded with `seed` whose profile endpoint returns `profile`.
pub fn session_store(seed: Option<&str>, profile: Option<User>) -> (Arc<StubAuthApi>, Arc<SessionStore>) {
    let api = Arc::new(StubAuthApi { profile, profile_calls: Mutex::new(0) });
    let storage: Arc<dyn TokenStorage> =
        Arc::new(seed.map_or_else(MemoryTokenStorage::new, MemoryTokenStorage::with_token));
    let dyn_api: Arc<dyn AuthApi> = api.clone();
    (api, Arc::new(SessionStore::new(dyn_api, storage)))
}
