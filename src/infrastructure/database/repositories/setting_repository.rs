use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::db_err;
use crate::domain::setting::{Setting, SettingRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::setting;

pub struct SeaOrmSettingRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: setting::Model) -> Setting {
    Setting {
        key: m.key,
        value: m.value,
        description: m.description,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl SettingRepository for SeaOrmSettingRepository {
    async fn list(&self) -> DomainResult<Vec<Setting>> {
        let models = setting::Entity::find()
            .order_by_asc(setting::Column::Key)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Setting>> {
        let model = setting::Entity::find_by_id(key)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> DomainResult<Setting> {
        let existing = setting::Entity::find_by_id(key)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let saved = match existing {
            Some(existing) => {
                let mut active: setting::ActiveModel = existing.into();
                active.value = Set(value.to_string());
                if let Some(description) = description {
                    active.description = Set(Some(description));
                }
                active.updated_at = Set(Utc::now());
                active.update(&self.db).await.map_err(db_err)?
            }
            None => setting::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                description: Set(description),
                updated_at: Set(Utc::now()),
            }
            .insert(&self.db)
            .await
            .map_err(db_err)?,
        };

        Ok(model_to_domain(saved))
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        let result = setting::Entity::delete_by_id(key)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Setting", "key", key));
        }
        Ok(())
    }
}
