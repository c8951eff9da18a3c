//! Medication catalog aggregate

pub mod model;
pub mod repository;

pub use model::{Medication, MedicationChanges, NewMedication, StockChange};
pub use repository::MedicationRepository;
