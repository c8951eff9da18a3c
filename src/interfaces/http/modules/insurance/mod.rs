//! Insurance module: the insurance provider directory

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
