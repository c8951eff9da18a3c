//! Settings module: key/value system configuration

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
