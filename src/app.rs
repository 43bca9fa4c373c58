//! Root application context: owns the API client, session store, and
//! navigator, and routes API events into navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The API client reports a rejected token as an [`ApiEvent`] instead of
//! redirecting on its own. This module is where that event becomes
//! "log out and go to the login page".

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{ClientConfig, ConfigError};
use crate::net::api::{ApiClient, ApiError, ApiEvent, AuthApi};
use crate::router::{LOGIN_PATH, Location, NavigationError, Navigator};
use crate::state::session::SessionStore;
use crate::storage::{FileTokenStorage, TokenStorage};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("api client error: {0}")]
    Api(#[from] ApiError),
}

pub struct App {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    navigator: Navigator,
    events: mpsc::UnboundedReceiver<ApiEvent>,
}

impl App {
    /// Build the app with the token persisted in `config.token_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(&config.token_file));
        tracing::debug!(base_url = %config.base_url, token_file = %config.token_file.display(), "building app");
        Ok(Self::with_storage(&config.base_url, storage)?)
    }

    /// Build the app against `base_url` with an explicit token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(base_url: &str, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let mut api = ApiClient::new(base_url, Arc::clone(&storage))?;
        let events = api.subscribe();
        let api = Arc::new(api);
        let auth: Arc<dyn AuthApi> = api.clone();
        let session = Arc::new(SessionStore::new(auth, storage));
        let navigator = Navigator::new(Arc::clone(&session));
        Ok(Self { api, session, navigator, events })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.navigator.current()
    }

    /// Navigate to `path`. If an API call made before or along the way
    /// reported an expired session, the session is dropped and the login
    /// page wins.
    ///
    /// # Errors
    ///
    /// Propagates [`NavigationError`] from the navigator.
    pub async fn navigate(&mut self, path: &str) -> Result<Location, NavigationError> {
        if let Some(login) = self.handle_events().await? {
            return Ok(login);
        }
        let location = self.navigator.navigate(path).await?;
        Ok(self.handle_events().await?.unwrap_or(location))
    }

    /// Drain pending API events.
    ///
    /// Returns the login location when an [`ApiEvent::Unauthorized`] forced
    /// a logout, `None` when nothing happened.
    ///
    /// # Errors
    ///
    /// Propagates [`NavigationError`] from the redirect to the login page.
    pub async fn handle_events(&mut self) -> Result<Option<Location>, NavigationError> {
        let mut unauthorized = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                ApiEvent::Unauthorized => unauthorized = true,
            }
        }
        if !unauthorized {
            return Ok(None);
        }
        tracing::info!("session rejected by server; redirecting to login");
        self.session.logout();
        self.navigator.navigate(LOGIN_PATH).await.map(Some)
    }
}
