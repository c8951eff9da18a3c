//! Prescriptions module: issuing and dispensing medication orders

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
