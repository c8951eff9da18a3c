//! Admissions module: ward and bed occupancy, discharge and bed charges

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
