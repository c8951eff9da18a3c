//! Appointment aggregate

pub mod model;
pub mod repository;

pub use model::{Appointment, AppointmentChanges, AppointmentStatus, NewAppointment};
pub use repository::AppointmentRepository;
