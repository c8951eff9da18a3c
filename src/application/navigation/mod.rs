//! Client-side route protection
//!
//! Pure decision logic for a front end: derive the auth state from a token
//! held by the client, then decide whether a route renders, waits or
//! redirects. This gates navigation only; the server's token middleware is
//! the security boundary.

pub mod guard;

pub use guard::{decide, landing_route, AuthState, Route, RouteDecision, SessionUser};
