//! Applies guard decisions to navigation requests.
//!
//! A navigation resolves the target path, applies the route's static
//! redirect, runs the guard, and follows any redirect it returns until a
//! route is allowed. Only the final location is committed.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use super::guard::{self, GuardDecision};
use super::routes::{self, RouteName};
use crate::state::session::SessionStore;

/// Upper bound on redirects followed for a single navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("navigation to {from} exceeded the redirect limit")]
    RedirectLoop { from: String },
}

/// A committed navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl Location {
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

pub struct Navigator {
    session: Arc<SessionStore>,
    current: Option<Location>,
}

impl Navigator {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session, current: None }
    }

    /// The last committed location, if any navigation has succeeded.
    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Navigate to `path`, following redirects, and commit the result.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] if `path` or a redirect target
    /// matches no route, and [`NavigationError::RedirectLoop`] if more than
    /// [`MAX_REDIRECTS`] redirects are followed.
    pub async fn navigate(&mut self, path: &str) -> Result<Location, NavigationError> {
        let mut target = path.to_owned();
        for _ in 0..=MAX_REDIRECTS {
            let matched = routes::resolve(&target).ok_or_else(|| NavigationError::NotFound(target.clone()))?;

            if let Some(redirect) = matched.route.redirect {
                tracing::debug!(from = %matched.path, to = redirect, "route redirect");
                target = redirect.to_owned();
                continue;
            }

            match guard::resolve(&matched.route.meta, &self.session).await {
                GuardDecision::Allow => {
                    let location = Location { name: matched.route.name, path: matched.path, params: matched.params };
                    tracing::debug!(path = %location.path, "navigation committed");
                    self.current = Some(location.clone());
                    return Ok(location);
                }
                GuardDecision::Redirect(to) => {
                    tracing::debug!(from = %matched.path, to, "guard redirect");
                    target = to.to_owned();
                }
                GuardDecision::Hydrate => unreachable!("guard::resolve hydrates before deciding"),
            }
        }
        Err(NavigationError::RedirectLoop { from: path.to_owned() })
    }
}
