//! Database entities module

pub mod admission;
pub mod appointment;
pub mod insurance_claim;
pub mod insurance_provider;
pub mod invoice;
pub mod medication;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod setting;
pub mod user;

pub use admission::Entity as Admission;
pub use appointment::Entity as Appointment;
pub use insurance_claim::Entity as InsuranceClaim;
pub use insurance_provider::Entity as InsuranceProvider;
pub use invoice::Entity as Invoice;
pub use medication::Entity as Medication;
pub use patient::Entity as Patient;
pub use payment::Entity as Payment;
pub use prescription::Entity as Prescription;
pub use setting::Entity as Setting;
pub use user::Entity as User;
