//! Shared client-side state.
//!
//! DESIGN
//! ======
//! State is split by domain so views can depend on small focused models. Only
//! the auth session is owned client-side; everything else is fetched per view.

pub mod session;
