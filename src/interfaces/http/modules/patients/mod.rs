//! Patients module: registration, lookup and demographics

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
