//! Repository access for the domain layer
//!
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::admission::AdmissionRepository;
use super::appointment::AppointmentRepository;
use super::insurance::InsuranceProviderRepository;
use super::invoice::{InsuranceClaimRepository, InvoiceRepository, PaymentRepository};
use super::medication::MedicationRepository;
use super::patient::PatientRepository;
use super::prescription::PrescriptionRepository;
use super::setting::SettingRepository;
use super::user::UserRepositoryInterface;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let patient = repos.patients().find_by_mrn("MRN-0001").await?;
///     let visits = repos.appointments().list_for_patient(&patient.id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepositoryInterface;
    fn patients(&self) -> &dyn PatientRepository;
    fn appointments(&self) -> &dyn AppointmentRepository;
    fn admissions(&self) -> &dyn AdmissionRepository;
    fn prescriptions(&self) -> &dyn PrescriptionRepository;
    fn insurance_providers(&self) -> &dyn InsuranceProviderRepository;
    fn invoices(&self) -> &dyn InvoiceRepository;
    fn payments(&self) -> &dyn PaymentRepository;
    fn insurance_claims(&self) -> &dyn InsuranceClaimRepository;
    fn medications(&self) -> &dyn MedicationRepository;
    fn settings(&self) -> &dyn SettingRepository;
}
