//! Inpatient admission aggregate

pub mod model;
pub mod repository;

pub use model::{Admission, NewAdmission};
pub use repository::AdmissionRepository;
