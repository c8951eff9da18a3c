use async_trait::async_trait;

use super::{NewPatient, Patient, PatientChanges};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Fails with `DomainError::Conflict { field: "mrn", .. }` on a duplicate MRN.
    async fn create(&self, patient: NewPatient) -> DomainResult<Patient>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Patient>>;
    async fn find_by_mrn(&self, mrn: &str) -> DomainResult<Option<Patient>>;

    /// Newest first.
    async fn list(&self, page: PageRequest) -> DomainResult<PaginatedResult<Patient>>;

    /// Case-insensitive substring match on first name, last name and MRN.
    async fn search(&self, query: &str, page: PageRequest)
        -> DomainResult<PaginatedResult<Patient>>;

    async fn update(&self, id: &str, changes: PatientChanges) -> DomainResult<Option<Patient>>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
