//! Prescription aggregate

pub mod model;
pub mod repository;

pub use model::{NewPrescription, Prescription, PrescriptionItem, PrescriptionStatus};
pub use repository::PrescriptionRepository;
