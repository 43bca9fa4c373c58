//! Client-side routing: route table, navigation guard, and navigator.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::GuardDecision;
pub use navigator::{Location, NavigationError, Navigator};
pub use routes::{DASHBOARD_PATH, LOGIN_PATH, RouteMeta, RouteName};
