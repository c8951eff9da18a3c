//! Appointments module: scheduling and status tracking

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
