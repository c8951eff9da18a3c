//! Identity module: authentication and user management
//!
//! `AuthService` orchestrates every user-related use-case: registration,
//! login, profile lookup, password changes, admin account management and
//! seeding the default staff accounts.

pub mod error;
pub mod service;

pub use error::AuthError;
pub use service::{AuthResult, AuthService, NewAccount};
