use async_trait::async_trait;

use super::Setting;
use crate::domain::DomainResult;

#[async_trait]
pub trait SettingRepository: Send + Sync {
    /// Sorted by key.
    async fn list(&self) -> DomainResult<Vec<Setting>>;
    async fn get(&self, key: &str) -> DomainResult<Option<Setting>>;

    /// Insert or replace. A `None` description keeps the stored one.
    async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> DomainResult<Setting>;
    async fn delete(&self, key: &str) -> DomainResult<()>;
}
