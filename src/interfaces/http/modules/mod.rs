//! HTTP feature modules, one per resource

pub mod admissions;
pub mod appointments;
pub mod auth;
pub mod billing;
pub mod health;
pub mod insurance;
pub mod medications;
pub mod metrics;
pub mod patients;
pub mod prescriptions;
pub mod request_id;
pub mod settings;
pub mod users;
