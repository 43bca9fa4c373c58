//! # feedback-client
//!
//! Client for the performance-feedback service: employees and managers
//! authenticate, view dashboards, and create, edit, and acknowledge feedback.
//!
//! This crate contains the wire types, the REST client, the persisted token
//! slot, the auth session store, and client-side routing with its
//! navigation guard. [`app::App`] wires them together.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_helpers;

pub use app::{App, AppError};
pub use config::ClientConfig;
pub use net::api::{ApiClient, ApiError, ApiEvent, AuthApi};
pub use state::session::{Session, SessionPhase, SessionStore};
