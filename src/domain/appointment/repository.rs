use async_trait::async_trait;

use super::{Appointment, AppointmentChanges, NewAppointment};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> DomainResult<Appointment>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Appointment>>;

    /// Soonest first.
    async fn list(&self, page: PageRequest) -> DomainResult<PaginatedResult<Appointment>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Appointment>>;
    async fn list_for_doctor(&self, doctor_id: &str) -> DomainResult<Vec<Appointment>>;

    async fn update(
        &self,
        id: &str,
        changes: AppointmentChanges,
    ) -> DomainResult<Option<Appointment>>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
