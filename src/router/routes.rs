//! Static route table and path matching.
//!
//! Each route carries the access flags the guard evaluates. Paths are matched
//! segment by segment; a `:name` segment captures any non-empty segment.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::BTreeMap;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Access requirements declared by a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub requires_manager: bool,
}

impl RouteMeta {
    const PUBLIC: Self = Self { requires_auth: false, requires_guest: false, requires_manager: false };
    const GUEST: Self = Self { requires_auth: false, requires_guest: true, requires_manager: false };
    const AUTH: Self = Self { requires_auth: true, requires_guest: false, requires_manager: false };
    const MANAGER: Self = Self { requires_auth: true, requires_guest: false, requires_manager: true };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteName {
    Root,
    Login,
    Register,
    Dashboard,
    Feedback,
    CreateFeedback,
    EditFeedback,
    Team,
    Profile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub path: &'static str,
    pub meta: RouteMeta,
    /// Unconditional redirect applied before guarding.
    pub redirect: Option<&'static str>,
}

pub static ROUTES: &[Route] = &[
    Route { name: RouteName::Root, path: "/", meta: RouteMeta::PUBLIC, redirect: Some(DASHBOARD_PATH) },
    Route { name: RouteName::Login, path: LOGIN_PATH, meta: RouteMeta::GUEST, redirect: None },
    Route { name: RouteName::Register, path: "/register", meta: RouteMeta::GUEST, redirect: None },
    Route { name: RouteName::Dashboard, path: DASHBOARD_PATH, meta: RouteMeta::AUTH, redirect: None },
    Route { name: RouteName::Feedback, path: "/feedback", meta: RouteMeta::AUTH, redirect: None },
    Route { name: RouteName::CreateFeedback, path: "/feedback/create", meta: RouteMeta::MANAGER, redirect: None },
    Route { name: RouteName::EditFeedback, path: "/feedback/edit/:id", meta: RouteMeta::MANAGER, redirect: None },
    Route { name: RouteName::Team, path: "/team", meta: RouteMeta::MANAGER, redirect: None },
    Route { name: RouteName::Profile, path: "/profile", meta: RouteMeta::AUTH, redirect: None },
];

/// A concrete path resolved against [`ROUTES`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    /// Normalized path (no query, fragment, or trailing slash).
    pub path: String,
    pub params: BTreeMap<String, String>,
}

/// Resolve `raw` to a route, ignoring any query string, fragment, and
/// trailing slash.
pub fn resolve(raw: &str) -> Option<RouteMatch> {
    let path = normalize(raw);
    let segments = split(&path);
    ROUTES.iter().find_map(|route| {
        let params = match_segments(&split(route.path), &segments)?;
        Some(RouteMatch { route, path: path.clone(), params })
    })
}

/// Look up a route by name.
pub fn route(name: RouteName) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.name == name)
}

fn normalize(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_segments(pattern: &[&str], segments: &[&str]) -> Option<BTreeMap<String, String>> {
    if pattern.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_owned(), (*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}
