use super::*;
use crate::net::types::Role;
use crate::router::routes::{RouteName, route};
use crate::test_helpers::{session_store, user};

// =========================================================================
// Helpers
// =========================================================================

fn anonymous() -> Session {
    Session::default()
}

fn signed_in(role: Role) -> Session {
    Session { token: Some("t".to_owned()), user: Some(user(role)), ..Session::default() }
}

fn meta(name: RouteName) -> RouteMeta {
    route(name).unwrap().meta
}

// =========================================================================
// decide
// =========================================================================

#[test]
fn auth_route_redirects_anonymous_to_login() {
    for name in [RouteName::Dashboard, RouteName::Feedback, RouteName::Profile, RouteName::Team] {
        assert_eq!(decide(&meta(name), &anonymous()), GuardDecision::Redirect("/login"), "{name:?}");
    }
}

#[test]
fn guest_route_redirects_authenticated_to_dashboard() {
    for role in [Role::Manager, Role::Employee] {
        assert_eq!(decide(&meta(RouteName::Login), &signed_in(role)), GuardDecision::Redirect("/dashboard"));
        assert_eq!(decide(&meta(RouteName::Register), &signed_in(role)), GuardDecision::Redirect("/dashboard"));
    }
}

#[test]
fn guest_route_allows_anonymous() {
    assert_eq!(decide(&meta(RouteName::Login), &anonymous()), GuardDecision::Allow);
}

#[test]
fn manager_route_redirects_employee_to_dashboard() {
    for name in [RouteName::CreateFeedback, RouteName::EditFeedback, RouteName::Team] {
        assert_eq!(decide(&meta(name), &signed_in(Role::Employee)), GuardDecision::Redirect("/dashboard"));
    }
}

#[test]
fn manager_route_allows_manager() {
    assert_eq!(decide(&meta(RouteName::Team), &signed_in(Role::Manager)), GuardDecision::Allow);
}

#[test]
fn auth_check_short_circuits_manager_check() {
    // Anonymous on a manager route goes to login, not dashboard.
    assert_eq!(decide(&meta(RouteName::CreateFeedback), &anonymous()), GuardDecision::Redirect("/login"));
}

#[test]
fn manager_flag_alone_redirects_anonymous_to_dashboard() {
    let only_manager = RouteMeta { requires_manager: true, ..RouteMeta::default() };
    assert_eq!(decide(&only_manager, &anonymous()), GuardDecision::Redirect("/dashboard"));
}

#[test]
fn public_route_always_allowed() {
    let public = RouteMeta::default();
    assert_eq!(decide(&public, &anonymous()), GuardDecision::Allow);
    assert_eq!(decide(&public, &signed_in(Role::Employee)), GuardDecision::Allow);
}

// =========================================================================
// check
// =========================================================================

#[test]
fn token_only_session_requests_hydration() {
    let token_only = Session { token: Some("t".to_owned()), ..Session::default() };
    assert_eq!(check(&meta(RouteName::Dashboard), &token_only), GuardDecision::Hydrate);
    assert_eq!(check(&RouteMeta::default(), &token_only), GuardDecision::Hydrate);
}

#[test]
fn check_decides_when_no_hydration_needed() {
    assert_eq!(check(&meta(RouteName::Dashboard), &anonymous()), GuardDecision::Redirect("/login"));
}

// =========================================================================
// resolve
// =========================================================================

#[tokio::test]
async fn hydration_success_allows_manager_route() {
    let (api, session) = session_store(Some("persisted"), Some(user(Role::Manager)));
    let decision = resolve(&meta(RouteName::Team), &session).await;
    assert_eq!(decision, GuardDecision::Allow);
    assert_eq!(api.profile_calls(), 1);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn hydration_failure_redirects_to_login() {
    let (api, session) = session_store(Some("expired"), None);
    let decision = resolve(&meta(RouteName::Team), &session).await;
    assert_eq!(decision, GuardDecision::Redirect("/login"));
    assert_eq!(api.profile_calls(), 1);
    assert!(session.token().is_none());
}

#[tokio::test]
async fn hydration_success_as_employee_redirects_manager_route() {
    let (_api, session) = session_store(Some("persisted"), Some(user(Role::Employee)));
    assert_eq!(resolve(&meta(RouteName::Team), &session).await, GuardDecision::Redirect("/dashboard"));
}

#[tokio::test]
async fn hydrated_session_on_guest_route_goes_to_dashboard() {
    let (_api, session) = session_store(Some("persisted"), Some(user(Role::Employee)));
    assert_eq!(resolve(&meta(RouteName::Login), &session).await, GuardDecision::Redirect("/dashboard"));
}

#[tokio::test]
async fn anonymous_resolve_makes_no_call() {
    let (api, session) = session_store(None, Some(user(Role::Manager)));
    assert_eq!(resolve(&meta(RouteName::Dashboard), &session).await, GuardDecision::Redirect("/login"));
    assert_eq!(api.profile_calls(), 0);
}

#[tokio::test]
async fn already_hydrated_session_is_not_refetched() {
    let (api, session) = session_store(Some("persisted"), Some(user(Role::Manager)));
    assert!(session.fetch_current_user().await);
    assert_eq!(resolve(&meta(RouteName::Profile), &session).await, GuardDecision::Allow);
    assert_eq!(api.profile_calls(), 1);
}

#[tokio::test]
async fn resolve_never_defers_to_hydration() {
    for profile in [Some(user(Role::Manager)), None] {
        let (_api, session) = session_store(Some("persisted"), profile);
        for name in [RouteName::Login, RouteName::Dashboard, RouteName::Team] {
            assert_ne!(resolve(&meta(name), &session).await, GuardDecision::Hydrate, "{name:?}");
        }
    }
}
