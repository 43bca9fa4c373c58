//! REST client for the feedback backend.
//!
//! Every call performs exactly one HTTP request and returns the typed body or
//! the underlying error unchanged. The bearer token is read from
//! [`TokenStorage`] per request, so a token written by the session store is
//! picked up by the very next call.
//!
//! ERROR HANDLING
//! ==============
//! The client never recovers from errors. Its single global side effect is on
//! HTTP 401 to a request that carried a bearer token: the persisted token is
//! cleared and [`ApiEvent::Unauthorized`] is emitted to the subscriber, which
//! the application wires to logout-and-redirect. The error is still returned
//! to the caller. A 401 from login (bad credentials) is an ordinary error.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use super::types::{
    ApiErrorBody, AuthResponse, EmployeeDashboard, Feedback, FeedbackCreate, FeedbackUpdate, LoginCredentials,
    ManagerDashboard, RegisterData, User,
};
use crate::storage::TokenStorage;

// =============================================================================
// ERRORS / EVENTS
// =============================================================================

/// Errors produced by API client calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned {status}{}", suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The stored token contains bytes that cannot appear in a header.
    #[error("stored token is not a valid header value")]
    InvalidToken,
}

impl ApiError {
    /// Server-provided message, if the backend sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Out-of-band notifications emitted by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiEvent {
    /// A call was rejected with 401; the persisted token has been cleared.
    Unauthorized,
}

// =============================================================================
// AUTH SEAM
// =============================================================================

/// The subset of the API the session store depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError>;
    async fn register(&self, data: &RegisterData) -> Result<User, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// A request ready to send, remembering whether it carried a bearer token.
struct Pending {
    builder: RequestBuilder,
    authenticated: bool,
}

impl Pending {
    fn json<B: Serialize + ?Sized>(self, body: &B) -> Self {
        Self { builder: self.builder.json(body), ..self }
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn TokenStorage>,
    events: Option<mpsc::UnboundedSender<ApiEvent>>,
}

impl ApiClient {
    /// Build a client for `base_url` reading its token from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), storage, events: None })
    }

    /// Subscribe to client events. A later call replaces the earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ApiEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Build a request, attaching the stored token when `with_token` is set.
    fn request(&self, method: Method, path: &str, with_token: bool) -> Result<Pending, ApiError> {
        let mut builder = self.http.request(method, self.endpoint(path));
        let token = if with_token { self.storage.load() } else { None };
        if let Some(token) = &token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ApiError::InvalidToken)?;
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(Pending { builder, authenticated: token.is_some() })
    }

    async fn execute<T: DeserializeOwned>(&self, pending: Pending) -> Result<T, ApiError> {
        let response = pending.builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED && pending.authenticated {
            self.handle_unauthorized();
        }
        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&text).ok().and_then(|b| b.message());
            tracing::debug!(status = status.as_u16(), detail = ?detail, "api call failed");
            return Err(ApiError::Status { status: status.as_u16(), detail });
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("api returned 401; clearing persisted token");
        self.storage.clear();
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is routing anymore.
            let _ = tx.send(ApiEvent::Unauthorized);
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let pending = self.request(Method::GET, path, true)?;
        self.execute(pending).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let pending = self.request(method, path, true)?.json(body);
        self.execute(pending).await
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        let pending = self.request(Method::POST, "/auth/login", false)?.json(credentials);
        self.execute(pending).await
    }

    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        let pending = self.request(Method::POST, "/auth/register", false)?.json(data);
        self.execute(pending).await
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// `GET /users/me`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn user_profile(&self) -> Result<User, ApiError> {
        self.get("/users/me").await
    }

    /// `GET /users/{id}`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn user(&self, user_id: i64) -> Result<User, ApiError> {
        self.get(&format!("/users/{user_id}")).await
    }

    /// `GET /users/team` (managers only).
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn team_members(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users/team").await
    }

    /// `GET /users/managers`, used to pick a manager during registration.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn managers(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users/managers").await
    }

    // -------------------------------------------------------------------------
    // Feedback
    // -------------------------------------------------------------------------

    /// `POST /feedback/`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn create_feedback(&self, feedback: &FeedbackCreate) -> Result<Feedback, ApiError> {
        self.send_json(Method::POST, "/feedback/", feedback).await
    }

    /// `GET /feedback/my-feedback`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn my_feedback(&self) -> Result<Vec<Feedback>, ApiError> {
        self.get("/feedback/my-feedback").await
    }

    /// `GET /feedback/employee/{id}`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn employee_feedback(&self, employee_id: i64) -> Result<Vec<Feedback>, ApiError> {
        self.get(&format!("/feedback/employee/{employee_id}")).await
    }

    /// `GET /feedback/`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn all_feedback(&self) -> Result<Vec<Feedback>, ApiError> {
        self.get("/feedback/").await
    }

    /// `GET /feedback/{id}`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn feedback(&self, feedback_id: i64) -> Result<Feedback, ApiError> {
        self.get(&format!("/feedback/{feedback_id}")).await
    }

    /// `PUT /feedback/{id}`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn update_feedback(&self, feedback_id: i64, update: &FeedbackUpdate) -> Result<Feedback, ApiError> {
        self.send_json(Method::PUT, &format!("/feedback/{feedback_id}"), update).await
    }

    /// `POST /feedback/{id}/acknowledge`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn acknowledge_feedback(&self, feedback_id: i64) -> Result<Feedback, ApiError> {
        let body = serde_json::json!({ "acknowledged": true });
        self.send_json(Method::POST, &format!("/feedback/{feedback_id}/acknowledge"), &body).await
    }

    /// `POST /feedback/{id}/comment`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn add_employee_comment(&self, feedback_id: i64, comment: &str) -> Result<Feedback, ApiError> {
        let body = serde_json::json!({ "comment": comment });
        self.send_json(Method::POST, &format!("/feedback/{feedback_id}/comment"), &body).await
    }

    // -------------------------------------------------------------------------
    // Dashboards
    // -------------------------------------------------------------------------

    /// `GET /dashboard/manager`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn manager_dashboard(&self) -> Result<ManagerDashboard, ApiError> {
        self.get("/dashboard/manager").await
    }

    /// `GET /dashboard/employee`
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decode failures.
    pub async fn employee_dashboard(&self) -> Result<EmployeeDashboard, ApiError> {
        self.get("/dashboard/employee").await
    }
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        ApiClient::register(self, data).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.user_profile().await
    }
}
