//! SeaORM implementation of MedicationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::{db_err, ilike, new_id, write_err};
use crate::domain::medication::{
    Medication, MedicationChanges, MedicationRepository, NewMedication, StockChange,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::medication;
use crate::shared::{PageRequest, PaginatedResult};

const UNIQUE_FIELDS: &[&str] = &["name"];

pub struct SeaOrmMedicationRepository {
    db: DatabaseConnection,
}

impl SeaOrmMedicationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn paginate(
        &self,
        query: Select<medication::Entity>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Medication>> {
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(medication::Column::Name)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page))
    }

    /// Single-statement adjustment guarded so the count stays in `0..=i32::MAX`.
    async fn adjust_stock(&self, id: &str, delta: i32) -> DomainResult<Option<Medication>> {
        let delta_wide = i64::from(delta);
        let result = medication::Entity::update_many()
            .col_expr(
                medication::Column::StockQuantity,
                Expr::col(medication::Column::StockQuantity).add(delta),
            )
            .col_expr(medication::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(medication::Column::Id.eq(id))
            .filter(Expr::col(medication::Column::StockQuantity).gte(-delta_wide))
            .filter(
                Expr::col(medication::Column::StockQuantity)
                    .lte(i64::from(i32::MAX) - delta_wide),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            let Some(current) = self.find_by_id(id).await? else {
                return Ok(None);
            };
            return Err(if delta < 0 {
                DomainError::Validation(format!(
                    "Insufficient stock: {} available",
                    current.stock_quantity
                ))
            } else {
                DomainError::Validation("Stock quantity is out of range".into())
            });
        }

        self.find_by_id(id).await
    }
}

fn model_to_domain(m: medication::Model) -> Medication {
    Medication {
        id: m.id,
        name: m.name,
        generic_name: m.generic_name,
        category: m.category,
        form: m.form,
        strength: m.strength,
        manufacturer: m.manufacturer,
        description: m.description,
        stock_quantity: m.stock_quantity,
        reorder_level: m.reorder_level,
        unit_price: m.unit_price,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl MedicationRepository for SeaOrmMedicationRepository {
    async fn create(&self, m: NewMedication) -> DomainResult<Medication> {
        let now = Utc::now();

        let model = medication::ActiveModel {
            id: Set(new_id()),
            name: Set(m.name),
            generic_name: Set(m.generic_name),
            category: Set(m.category),
            form: Set(m.form),
            strength: Set(m.strength),
            manufacturer: Set(m.manufacturer),
            description: Set(m.description),
            stock_quantity: Set(m.stock_quantity),
            reorder_level: Set(m.reorder_level),
            unit_price: Set(m.unit_price),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Medication", UNIQUE_FIELDS))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Medication>> {
        let model = medication::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(
        &self,
        low_stock_only: bool,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Medication>> {
        let mut query = medication::Entity::find();
        if low_stock_only {
            query = query.filter(
                Expr::col(medication::Column::StockQuantity)
                    .lte(Expr::col(medication::Column::ReorderLevel)),
            );
        }
        self.paginate(query, page).await
    }

    async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Medication>> {
        let select = medication::Entity::find().filter(
            Condition::any()
                .add(ilike(medication::Column::Name, query))
                .add(ilike(medication::Column::GenericName, query))
                .add(ilike(medication::Column::Manufacturer, query))
                .add(ilike(medication::Column::Description, query)),
        );
        self.paginate(select, page).await
    }

    async fn update(
        &self,
        id: &str,
        changes: MedicationChanges,
    ) -> DomainResult<Option<Medication>> {
        let existing = medication::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: medication::ActiveModel = existing.into();

        if let Some(v) = changes.name {
            active.name = Set(v);
        }
        if let Some(v) = changes.generic_name {
            active.generic_name = Set(Some(v));
        }
        if let Some(v) = changes.category {
            active.category = Set(Some(v));
        }
        if let Some(v) = changes.form {
            active.form = Set(Some(v));
        }
        if let Some(v) = changes.strength {
            active.strength = Set(Some(v));
        }
        if let Some(v) = changes.manufacturer {
            active.manufacturer = Set(Some(v));
        }
        if let Some(v) = changes.description {
            active.description = Set(Some(v));
        }
        if let Some(v) = changes.reorder_level {
            active.reorder_level = Set(v);
        }
        if let Some(v) = changes.unit_price {
            active.unit_price = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Medication", UNIQUE_FIELDS))?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn update_stock(
        &self,
        id: &str,
        change: StockChange,
    ) -> DomainResult<Option<Medication>> {
        match change {
            StockChange::Adjust(delta) => self.adjust_stock(id, delta).await,
            StockChange::Set(quantity) if quantity < 0 => Err(DomainError::Validation(
                "Stock quantity cannot be negative".into(),
            )),
            StockChange::Set(quantity) => {
                let existing = medication::Entity::find_by_id(id)
                    .one(&self.db)
                    .await
                    .map_err(db_err)?;

                let Some(existing) = existing else {
                    return Ok(None);
                };

                let mut active: medication::ActiveModel = existing.into();
                active.stock_quantity = Set(quantity);
                active.updated_at = Set(Utc::now());

                let updated = active.update(&self.db).await.map_err(db_err)?;
                Ok(Some(model_to_domain(updated)))
            }
        }
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = medication::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Medication", "id", id));
        }
        Ok(())
    }
}
