//! # HMIS service
//!
//! Hospital management REST API: staff accounts and roles, patients,
//! appointments, admissions, prescriptions, the pharmacy medication
//! catalog, billing (invoices, payments, insurance claims), insurance
//! providers and system settings.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: aggregates, value types and repository traits
//! - **application**: authentication use cases and route guard decisions
//! - **infrastructure**: SeaORM persistence, JWT and bcrypt
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process lifecycle (migrations, seeding, graceful shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::{create_api_router, ApiState};
