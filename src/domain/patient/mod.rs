//! Patient aggregate

pub mod model;
pub mod repository;

pub use model::{BloodType, Gender, NewPatient, Patient, PatientChanges};
pub use repository::PatientRepository;
