use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{db_err, ilike, new_id, write_err};
use crate::domain::insurance::{
    InsuranceProvider, InsuranceProviderChanges, InsuranceProviderRepository, NewInsuranceProvider,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::insurance_provider;

const UNIQUE_FIELDS: &[&str] = &["name"];

pub struct SeaOrmInsuranceProviderRepository {
    db: DatabaseConnection,
}

impl SeaOrmInsuranceProviderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: insurance_provider::Model) -> InsuranceProvider {
    InsuranceProvider {
        id: m.id,
        name: m.name,
        code: m.code,
        contact_phone: m.contact_phone,
        contact_email: m.contact_email,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl InsuranceProviderRepository for SeaOrmInsuranceProviderRepository {
    async fn create(&self, p: NewInsuranceProvider) -> DomainResult<InsuranceProvider> {
        let now = Utc::now();

        let model = insurance_provider::ActiveModel {
            id: Set(new_id()),
            name: Set(p.name),
            code: Set(p.code),
            contact_phone: Set(p.contact_phone),
            contact_email: Set(p.contact_email),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Insurance provider", UNIQUE_FIELDS))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<InsuranceProvider>> {
        let model = insurance_provider::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, search: Option<&str>, limit: u64) -> DomainResult<Vec<InsuranceProvider>> {
        let mut query = insurance_provider::Entity::find();
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(ilike(insurance_provider::Column::Name, search));
        }

        let models = query
            .order_by_asc(insurance_provider::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(
        &self,
        id: &str,
        changes: InsuranceProviderChanges,
    ) -> DomainResult<Option<InsuranceProvider>> {
        let existing = insurance_provider::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: insurance_provider::ActiveModel = existing.into();

        if let Some(v) = changes.name {
            active.name = Set(v);
        }
        if let Some(v) = changes.code {
            active.code = Set(Some(v));
        }
        if let Some(v) = changes.contact_phone {
            active.contact_phone = Set(Some(v));
        }
        if let Some(v) = changes.contact_email {
            active.contact_email = Set(Some(v));
        }
        if let Some(v) = changes.is_active {
            active.is_active = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Insurance provider", UNIQUE_FIELDS))?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = insurance_provider::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, "Insurance provider", &[]))?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Insurance provider", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;

    fn provider(name: &str) -> NewInsuranceProvider {
        NewInsuranceProvider {
            name: name.into(),
            code: None,
            contact_phone: None,
            contact_email: None,
        }
    }

    #[tokio::test]
    async fn list_is_sorted_filtered_and_capped() {
        let repo = SeaOrmInsuranceProviderRepository::new(test_database().await);
        for name in ["Zenith Health", "Acme Mutual", "Blue Shield", "Acme Dental"] {
            repo.create(provider(name)).await.unwrap();
        }

        let all = repo.list(None, 20).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Acme Dental", "Acme Mutual", "Blue Shield", "Zenith Health"]
        );

        assert_eq!(repo.list(Some("acme"), 20).await.unwrap().len(), 2);
        assert_eq!(repo.list(None, 3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let repo = SeaOrmInsuranceProviderRepository::new(test_database().await);
        repo.create(provider("Acme Mutual")).await.unwrap();

        let err = repo.create(provider("Acme Mutual")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { field: "name", .. }));
    }

    #[tokio::test]
    async fn deactivate_via_update() {
        let repo = SeaOrmInsuranceProviderRepository::new(test_database().await);
        let p = repo.create(provider("Acme Mutual")).await.unwrap();
        assert!(p.is_active);

        let updated = repo
            .update(
                &p.id,
                InsuranceProviderChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.name, "Acme Mutual");
    }
}
