//! Insurance provider aggregate

pub mod model;
pub mod repository;

pub use model::{InsuranceProvider, InsuranceProviderChanges, NewInsuranceProvider};
pub use repository::InsuranceProviderRepository;
