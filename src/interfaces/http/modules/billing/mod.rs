//! Billing module: invoices, payments, insurance claims and the
//! per-patient billing summary

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
