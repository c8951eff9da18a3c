//! Application layer: use-case orchestration over domain repositories.
//!
//! - `identity`: registration, login, profile, password and account management
//! - `navigation`: client route guard decisions

pub mod identity;
pub mod navigation;

pub use identity::{AuthError, AuthResult, AuthService, NewAccount};
pub use navigation::{decide, landing_route, AuthState, Route, RouteDecision, SessionUser};
