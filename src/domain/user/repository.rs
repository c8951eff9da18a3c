use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, GetUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

/// Credential store.
///
/// Implementations must enforce username and email uniqueness themselves
/// and report a violation as `DomainError::Conflict` with `field` set to
/// `"username"` or `"email"`.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>>;
    async fn count_users(&self) -> DomainResult<u64>;
    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()>;
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
