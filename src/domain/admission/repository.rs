use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Admission, NewAdmission};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait AdmissionRepository: Send + Sync {
    async fn create(&self, admission: NewAdmission) -> DomainResult<Admission>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Admission>>;
    async fn find_active_for_patient(&self, patient_id: &str) -> DomainResult<Option<Admission>>;

    async fn list(
        &self,
        active_only: bool,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Admission>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Admission>>;

    /// Sets `discharge_date`. Returns `None` when the admission does not exist.
    async fn discharge(&self, id: &str, at: DateTime<Utc>) -> DomainResult<Option<Admission>>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
