use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::warn;

use super::{db_err, new_id, write_err};
use crate::domain::prescription::{
    NewPrescription, Prescription, PrescriptionItem, PrescriptionRepository, PrescriptionStatus,
};
use crate::domain::{DomainError, DomainResult, InfraError};
use crate::infrastructure::database::entities::prescription;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmPrescriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmPrescriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: prescription::Model) -> DomainResult<Prescription> {
    let items: Vec<PrescriptionItem> =
        serde_json::from_str(&m.items).map_err(InfraError::Serialization)?;
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(prescription_id = %m.id, status = %m.status, "Unknown stored prescription status");
        PrescriptionStatus::Pending
    });

    Ok(Prescription {
        status,
        items,
        id: m.id,
        patient_id: m.patient_id,
        doctor_id: m.doctor_id,
        prescription_date: m.prescription_date,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<prescription::Model>) -> DomainResult<Vec<Prescription>> {
    models.into_iter().map(model_to_domain).collect()
}

#[async_trait]
impl PrescriptionRepository for SeaOrmPrescriptionRepository {
    async fn create(&self, p: NewPrescription) -> DomainResult<Prescription> {
        let now = Utc::now();
        let items = serde_json::to_string(&p.items).map_err(InfraError::Serialization)?;

        let model = prescription::ActiveModel {
            id: Set(new_id()),
            patient_id: Set(p.patient_id),
            doctor_id: Set(p.doctor_id),
            prescription_date: Set(p.prescription_date),
            status: Set(PrescriptionStatus::Pending.as_str().to_string()),
            notes: Set(p.notes),
            items: Set(items),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Prescription", &[]))?;
        model_to_domain(inserted)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Prescription>> {
        let model = prescription::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn list(
        &self,
        status: Option<PrescriptionStatus>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Prescription>> {
        let mut query = prescription::Entity::find();
        if let Some(status) = status {
            query = query.filter(prescription::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(prescription::Column::PrescriptionDate)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(models_to_domain(models)?, total, page))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Prescription>> {
        let models = prescription::Entity::find()
            .filter(prescription::Column::PatientId.eq(patient_id))
            .order_by_desc(prescription::Column::PrescriptionDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn update_status(
        &self,
        id: &str,
        status: PrescriptionStatus,
    ) -> DomainResult<Option<Prescription>> {
        let existing = prescription::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: prescription::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated).map(Some)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = prescription::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Prescription", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::repositories::fixtures::{seed_doctor, seed_patient};
    use crate::infrastructure::database::test_database;

    fn amoxicillin() -> PrescriptionItem {
        PrescriptionItem {
            medication: "Amoxicillin".into(),
            dosage: "500mg".into(),
            frequency: "3x daily".into(),
            duration: "7 days".into(),
            quantity: 21,
            instructions: Some("After meals".into()),
        }
    }

    #[tokio::test]
    async fn items_survive_storage_and_status_filter_applies() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let doctor = seed_doctor(&db, "dr_house").await;
        let repo = SeaOrmPrescriptionRepository::new(db);

        let rx = repo
            .create(NewPrescription {
                patient_id: patient.id.clone(),
                doctor_id: doctor.id.clone(),
                prescription_date: Utc::now(),
                notes: None,
                items: vec![amoxicillin()],
            })
            .await
            .unwrap();
        assert_eq!(rx.status, PrescriptionStatus::Pending);

        let loaded = repo.find_by_id(&rx.id).await.unwrap().unwrap();
        assert_eq!(loaded.items, vec![amoxicillin()]);

        repo.update_status(&rx.id, PrescriptionStatus::Dispensed)
            .await
            .unwrap()
            .unwrap();

        let pending = repo
            .list(Some(PrescriptionStatus::Pending), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(pending.total, 0);

        let dispensed = repo
            .list(Some(PrescriptionStatus::Dispensed), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(dispensed.total, 1);
        assert_eq!(repo.list_for_patient(&patient.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_prescription_is_not_found() {
        let repo = SeaOrmPrescriptionRepository::new(test_database().await);

        assert!(repo
            .update_status("missing", PrescriptionStatus::Cancelled)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            repo.delete("missing").await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
