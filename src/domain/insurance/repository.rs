use async_trait::async_trait;

use super::{InsuranceProvider, InsuranceProviderChanges, NewInsuranceProvider};
use crate::domain::DomainResult;

#[async_trait]
pub trait InsuranceProviderRepository: Send + Sync {
    async fn create(&self, provider: NewInsuranceProvider) -> DomainResult<InsuranceProvider>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<InsuranceProvider>>;

    /// Sorted by name, at most `limit` rows, optional case-insensitive name filter.
    async fn list(&self, search: Option<&str>, limit: u64) -> DomainResult<Vec<InsuranceProvider>>;

    async fn update(
        &self,
        id: &str,
        changes: InsuranceProviderChanges,
    ) -> DomainResult<Option<InsuranceProvider>>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
