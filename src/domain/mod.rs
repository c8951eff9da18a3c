//! Domain layer: aggregates and their repository contracts.
//!
//! Each aggregate lives in its own module with a `model` and a
//! `repository` submodule. Persistence implementations live in
//! `infrastructure::database::repositories`.

pub mod admission;
pub mod appointment;
pub mod insurance;
pub mod invoice;
pub mod medication;
pub mod patient;
pub mod prescription;
pub mod repositories;
pub mod setting;
pub mod user;

pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{
    CreateUserDto, GetUserDto, UpdateUserDto, User, UserRepositoryInterface, UserRole,
};

pub use crate::shared::errors::{DomainError, InfraError};
