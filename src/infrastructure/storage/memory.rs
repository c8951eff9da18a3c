//! In-memory user store for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, GetUserDto, UpdateUserDto, User,
    UserRepositoryInterface,
};
use crate::shared::PaginatedResult;

/// Users keyed by id, with username and email indexes.
///
/// Index entries are claimed through `DashMap::entry`, so two concurrent
/// registrations of the same username cannot both succeed.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    usernames: DashMap<String, String>,
    emails: DashMap<String, String>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(
        index: &DashMap<String, String>,
        key: &str,
        id: &str,
        field: &'static str,
    ) -> DomainResult<()> {
        match index.entry(key.to_string()) {
            Entry::Occupied(_) => Err(DomainError::Conflict {
                entity: "User",
                field,
            }),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }

    fn matches(user: &User, dto: &GetUserDto) -> bool {
        if let Some(role) = dto.role {
            if user.role != role {
                return false;
            }
        }
        match dto.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => {
                let needle = search.to_lowercase();
                [&user.username, &user.email, &user.first_name, &user.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let id = uuid::Uuid::new_v4().to_string();

        Self::claim(&self.usernames, &dto.username, &id, "username")?;
        if let Err(e) = Self::claim(&self.emails, &dto.email, &id, "email") {
            self.usernames.remove(&dto.username);
            return Err(e);
        }

        let now = Utc::now();
        let user = User {
            id: id.clone(),
            username: dto.username,
            email: dto.email,
            password_hash: dto.password_hash,
            first_name: dto.first_name,
            last_name: dto.last_name,
            role: dto.role,
            department: dto.department,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let mut matching: Vec<User> = self
            .users
            .iter()
            .filter(|entry| Self::matches(entry.value(), &dto))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| a.username.cmp(&b.username));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(dto.page.offset as usize)
            .take(dto.page.limit as usize)
            .collect();
        Ok(PaginatedResult::new(items, total, dto.page))
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let id = self.usernames.get(username).map(|id| id.value().clone());
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.value().clone())))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let id = self.emails.get(email).map(|id| id.value().clone());
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.value().clone())))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(current_email) = self.users.get(id).map(|u| u.email.clone()) else {
            return Ok(None);
        };

        if let Some(email) = dto.email.as_deref().filter(|e| *e != current_email) {
            Self::claim(&self.emails, email, id, "email")?;
            self.emails.remove(&current_email);
        }

        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(email) = dto.email {
            user.email = email;
        }
        if let Some(first_name) = dto.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = dto.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = dto.role {
            user.role = role;
        }
        if let Some(department) = dto.department {
            user.department = Some(department);
        }
        if let Some(is_active) = dto.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        user.password_hash = new_password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let (_, user) = self
            .users
            .remove(id)
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;
        self.usernames.remove(&user.username);
        self.emails.remove(&user.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::UserRole;

    fn dto(username: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role: UserRole::Nurse,
            department: None,
        }
    }

    #[tokio::test]
    async fn email_conflict_releases_the_username() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(dto("alice", "a@x.com")).await.unwrap();

        let err = repo.create_user(dto("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field: "email", .. }));

        repo.create_user(dto("bob", "b@x.com")).await.unwrap();
        assert_eq!(repo.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_registrations_admit_exactly_one() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_user(dto("alice", &format!("a{}@x.com", i))).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn email_change_moves_the_index() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user(dto("alice", "a@x.com")).await.unwrap();

        repo.update_user(
            &user.id,
            UpdateUserDto {
                email: Some("alice@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(repo.get_user_by_email("a@x.com").await.unwrap().is_none());
        assert!(repo.get_user_by_email("alice@x.com").await.unwrap().is_some());

        repo.delete_user(&user.id).await.unwrap();
        repo.create_user(dto("alice", "alice@x.com")).await.unwrap();
    }
}
