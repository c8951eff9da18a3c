//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::admission::AdmissionRepository;
use crate::domain::appointment::AppointmentRepository;
use crate::domain::insurance::InsuranceProviderRepository;
use crate::domain::invoice::{InsuranceClaimRepository, InvoiceRepository, PaymentRepository};
use crate::domain::medication::MedicationRepository;
use crate::domain::patient::PatientRepository;
use crate::domain::prescription::PrescriptionRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::setting::SettingRepository;
use crate::domain::UserRepositoryInterface;

use super::admission_repository::SeaOrmAdmissionRepository;
use super::appointment_repository::SeaOrmAppointmentRepository;
use super::claim_repository::SeaOrmInsuranceClaimRepository;
use super::insurance_repository::SeaOrmInsuranceProviderRepository;
use super::invoice_repository::SeaOrmInvoiceRepository;
use super::medication_repository::SeaOrmMedicationRepository;
use super::patient_repository::SeaOrmPatientRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::prescription_repository::SeaOrmPrescriptionRepository;
use super::setting_repository::SeaOrmSettingRepository;
use super::user_repository::UserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let patient = repos.patients().find_by_mrn("MRN-0001").await?;
/// let stay = repos.admissions().find_active_for_patient(&patient.id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: UserRepository,
    patients: SeaOrmPatientRepository,
    appointments: SeaOrmAppointmentRepository,
    admissions: SeaOrmAdmissionRepository,
    prescriptions: SeaOrmPrescriptionRepository,
    insurance_providers: SeaOrmInsuranceProviderRepository,
    invoices: SeaOrmInvoiceRepository,
    payments: SeaOrmPaymentRepository,
    insurance_claims: SeaOrmInsuranceClaimRepository,
    medications: SeaOrmMedicationRepository,
    settings: SeaOrmSettingRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            patients: SeaOrmPatientRepository::new(db.clone()),
            appointments: SeaOrmAppointmentRepository::new(db.clone()),
            admissions: SeaOrmAdmissionRepository::new(db.clone()),
            prescriptions: SeaOrmPrescriptionRepository::new(db.clone()),
            insurance_providers: SeaOrmInsuranceProviderRepository::new(db.clone()),
            invoices: SeaOrmInvoiceRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db.clone()),
            insurance_claims: SeaOrmInsuranceClaimRepository::new(db.clone()),
            medications: SeaOrmMedicationRepository::new(db.clone()),
            settings: SeaOrmSettingRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }

    fn patients(&self) -> &dyn PatientRepository {
        &self.patients
    }

    fn appointments(&self) -> &dyn AppointmentRepository {
        &self.appointments
    }

    fn admissions(&self) -> &dyn AdmissionRepository {
        &self.admissions
    }

    fn prescriptions(&self) -> &dyn PrescriptionRepository {
        &self.prescriptions
    }

    fn insurance_providers(&self) -> &dyn InsuranceProviderRepository {
        &self.insurance_providers
    }

    fn invoices(&self) -> &dyn InvoiceRepository {
        &self.invoices
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn insurance_claims(&self) -> &dyn InsuranceClaimRepository {
        &self.insurance_claims
    }

    fn medications(&self) -> &dyn MedicationRepository {
        &self.medications
    }

    fn settings(&self) -> &dyn SettingRepository {
        &self.settings
    }
}
