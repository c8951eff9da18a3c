use async_trait::async_trait;

use super::{NewPrescription, Prescription, PrescriptionStatus};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    async fn create(&self, prescription: NewPrescription) -> DomainResult<Prescription>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Prescription>>;

    /// Newest first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<PrescriptionStatus>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Prescription>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Prescription>>;

    async fn update_status(
        &self,
        id: &str,
        status: PrescriptionStatus,
    ) -> DomainResult<Option<Prescription>>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
