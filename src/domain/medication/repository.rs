use async_trait::async_trait;

use super::{Medication, MedicationChanges, NewMedication, StockChange};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait MedicationRepository: Send + Sync {
    async fn create(&self, medication: NewMedication) -> DomainResult<Medication>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Medication>>;

    /// Ordered by name. `low_stock_only` keeps entries at or below their
    /// reorder level.
    async fn list(
        &self,
        low_stock_only: bool,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Medication>>;

    /// Case-insensitive substring match on name, generic name,
    /// manufacturer and description.
    async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Medication>>;

    async fn update(
        &self,
        id: &str,
        changes: MedicationChanges,
    ) -> DomainResult<Option<Medication>>;

    /// An adjustment that would take stock below zero fails with a
    /// validation error and leaves the row untouched.
    async fn update_stock(&self, id: &str, change: StockChange)
        -> DomainResult<Option<Medication>>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}
