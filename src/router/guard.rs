//! Navigation guard.
//!
//! Evaluated from scratch for every navigation attempt, in this order:
//! hydrate a token-only session, then `requires_auth`, `requires_guest`,
//! `requires_manager`. The first failing check decides the redirect.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::{DASHBOARD_PATH, LOGIN_PATH, RouteMeta};
use crate::state::session::{Session, SessionStore};

/// Outcome of evaluating a route against a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
    /// The session holds a token without a user; hydrate, then check again.
    Hydrate,
}

/// Synchronous evaluation. Returns [`GuardDecision::Hydrate`] instead of
/// deciding against a token-only session.
#[must_use]
pub fn check(meta: &RouteMeta, session: &Session) -> GuardDecision {
    if session.needs_hydration() {
        return GuardDecision::Hydrate;
    }
    decide(meta, session)
}

/// Authorization checks alone, against whatever state the session holds.
#[must_use]
pub fn decide(meta: &RouteMeta, session: &Session) -> GuardDecision {
    let authenticated = session.is_authenticated();
    if meta.requires_auth && !authenticated {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    if meta.requires_guest && authenticated {
        return GuardDecision::Redirect(DASHBOARD_PATH);
    }
    if meta.requires_manager && !session.is_manager() {
        return GuardDecision::Redirect(DASHBOARD_PATH);
    }
    GuardDecision::Allow
}

/// Full evaluation: hydrates a token-only session before deciding.
///
/// Never returns [`GuardDecision::Hydrate`]. Hydration runs at most once per
/// call; whatever state it leaves is what the checks see.
pub async fn resolve(meta: &RouteMeta, session: &SessionStore) -> GuardDecision {
    match check(meta, &session.snapshot()) {
        GuardDecision::Hydrate => {
            let hydrated = session.fetch_current_user().await;
            tracing::debug!(hydrated, "guard hydration finished");
            decide(meta, &session.snapshot())
        }
        decision => decision,
    }
}
