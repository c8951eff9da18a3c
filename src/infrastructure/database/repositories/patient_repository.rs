//! SeaORM implementation of PatientRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use tracing::warn;

use super::{db_err, ilike, new_id, write_err};
use crate::domain::patient::{Gender, NewPatient, Patient, PatientChanges, PatientRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::patient;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmPatientRepository {
    db: DatabaseConnection,
}

impl SeaOrmPatientRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn paginate(
        &self,
        query: Select<patient::Entity>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Patient>> {
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(patient::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: patient::Model) -> Patient {
    let gender = m.gender.parse().unwrap_or_else(|_| {
        warn!(patient_id = %m.id, gender = %m.gender, "Unknown stored gender");
        Gender::Other
    });

    Patient {
        gender,
        blood_type: m.blood_type.as_deref().and_then(|bt| bt.parse().ok()),
        id: m.id,
        mrn: m.mrn,
        first_name: m.first_name,
        last_name: m.last_name,
        date_of_birth: m.date_of_birth,
        address: m.address,
        phone: m.phone,
        email: m.email,
        insurance_provider: m.insurance_provider,
        insurance_id: m.insurance_id,
        allergies: m.allergies,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── PatientRepository impl ──────────────────────────────────────

#[async_trait]
impl PatientRepository for SeaOrmPatientRepository {
    async fn create(&self, p: NewPatient) -> DomainResult<Patient> {
        let now = Utc::now();

        let model = patient::ActiveModel {
            id: Set(new_id()),
            mrn: Set(p.mrn),
            first_name: Set(p.first_name),
            last_name: Set(p.last_name),
            date_of_birth: Set(p.date_of_birth),
            gender: Set(p.gender.as_str().to_string()),
            address: Set(p.address),
            phone: Set(p.phone),
            email: Set(p.email),
            insurance_provider: Set(p.insurance_provider),
            insurance_id: Set(p.insurance_id),
            blood_type: Set(p.blood_type.map(|bt| bt.as_str().to_string())),
            allergies: Set(p.allergies),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Patient", &["mrn"]))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Patient>> {
        let model = patient::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_mrn(&self, mrn: &str) -> DomainResult<Option<Patient>> {
        let model = patient::Entity::find()
            .filter(patient::Column::Mrn.eq(mrn))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, page: PageRequest) -> DomainResult<PaginatedResult<Patient>> {
        self.paginate(patient::Entity::find(), page).await
    }

    async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Patient>> {
        let select = patient::Entity::find().filter(
            Condition::any()
                .add(ilike(patient::Column::FirstName, query))
                .add(ilike(patient::Column::LastName, query))
                .add(ilike(patient::Column::Mrn, query)),
        );
        self.paginate(select, page).await
    }

    async fn update(&self, id: &str, changes: PatientChanges) -> DomainResult<Option<Patient>> {
        let existing = patient::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: patient::ActiveModel = existing.into();

        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.date_of_birth {
            active.date_of_birth = Set(v);
        }
        if let Some(v) = changes.gender {
            active.gender = Set(v.as_str().to_string());
        }
        if let Some(v) = changes.address {
            active.address = Set(Some(v));
        }
        if let Some(v) = changes.phone {
            active.phone = Set(Some(v));
        }
        if let Some(v) = changes.email {
            active.email = Set(Some(v));
        }
        if let Some(v) = changes.insurance_provider {
            active.insurance_provider = Set(Some(v));
        }
        if let Some(v) = changes.insurance_id {
            active.insurance_id = Set(Some(v));
        }
        if let Some(v) = changes.blood_type {
            active.blood_type = Set(Some(v.as_str().to_string()));
        }
        if let Some(v) = changes.allergies {
            active.allergies = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Patient", &["mrn"]))?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = patient::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, "Patient", &[]))?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Patient", "id", id));
        }
        Ok(())
    }
}
