use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{db_err, new_id, write_err};
use crate::domain::admission::{Admission, AdmissionRepository, NewAdmission};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::admission;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmAdmissionRepository {
    db: DatabaseConnection,
}

impl SeaOrmAdmissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: admission::Model) -> Admission {
    Admission {
        id: m.id,
        patient_id: m.patient_id,
        ward: m.ward,
        bed: m.bed,
        admitting_doctor_id: m.admitting_doctor_id,
        diagnosis: m.diagnosis,
        daily_bed_rate: m.daily_bed_rate,
        admission_date: m.admission_date,
        discharge_date: m.discharge_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl AdmissionRepository for SeaOrmAdmissionRepository {
    async fn create(&self, a: NewAdmission) -> DomainResult<Admission> {
        let now = Utc::now();

        let model = admission::ActiveModel {
            id: Set(new_id()),
            patient_id: Set(a.patient_id),
            ward: Set(a.ward),
            bed: Set(a.bed),
            admitting_doctor_id: Set(a.admitting_doctor_id),
            diagnosis: Set(a.diagnosis),
            daily_bed_rate: Set(a.daily_bed_rate),
            admission_date: Set(a.admission_date),
            discharge_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Admission", &["patient_id"]))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Admission>> {
        let model = admission::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_for_patient(&self, patient_id: &str) -> DomainResult<Option<Admission>> {
        let model = admission::Entity::find()
            .filter(admission::Column::PatientId.eq(patient_id))
            .filter(admission::Column::DischargeDate.is_null())
            .order_by_desc(admission::Column::AdmissionDate)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(
        &self,
        active_only: bool,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Admission>> {
        let mut query = admission::Entity::find();
        if active_only {
            query = query.filter(admission::Column::DischargeDate.is_null());
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(admission::Column::AdmissionDate)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Admission>> {
        let models = admission::Entity::find()
            .filter(admission::Column::PatientId.eq(patient_id))
            .order_by_desc(admission::Column::AdmissionDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn discharge(&self, id: &str, at: DateTime<Utc>) -> DomainResult<Option<Admission>> {
        let existing = admission::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: admission::ActiveModel = existing.into();
        active.discharge_date = Set(Some(at));
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = admission::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Admission", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::repositories::fixtures::seed_patient;
    use crate::infrastructure::database::test_database;

    fn ward_stay(patient_id: &str) -> NewAdmission {
        NewAdmission {
            patient_id: patient_id.into(),
            ward: "General".into(),
            bed: "G-4".into(),
            admitting_doctor_id: None,
            diagnosis: Some("Pneumonia".into()),
            daily_bed_rate: 12_500,
            admission_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn discharge_closes_the_active_stay() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let repo = SeaOrmAdmissionRepository::new(db);

        let stay = repo.create(ward_stay(&patient.id)).await.unwrap();
        let active = repo.find_active_for_patient(&patient.id).await.unwrap();
        assert_eq!(active.map(|a| a.id), Some(stay.id.clone()));

        let discharged = repo.discharge(&stay.id, Utc::now()).await.unwrap().unwrap();
        assert!(!discharged.is_active());
        assert!(repo
            .find_active_for_patient(&patient.id)
            .await
            .unwrap()
            .is_none());

        assert!(repo.discharge("missing", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_open_stay_is_a_conflict() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let repo = SeaOrmAdmissionRepository::new(db);

        let first = repo.create(ward_stay(&patient.id)).await.unwrap();
        let err = repo.create(ward_stay(&patient.id)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                entity: "Admission",
                field: "patient_id"
            }
        ));

        repo.discharge(&first.id, Utc::now()).await.unwrap();
        assert!(repo.create(ward_stay(&patient.id)).await.is_ok());
    }

    #[tokio::test]
    async fn list_can_restrict_to_active_stays() {
        let db = test_database().await;
        let first = seed_patient(&db, "MRN-1").await;
        let second = seed_patient(&db, "MRN-2").await;
        let repo = SeaOrmAdmissionRepository::new(db);

        let done = repo.create(ward_stay(&first.id)).await.unwrap();
        repo.discharge(&done.id, Utc::now()).await.unwrap();
        repo.create(ward_stay(&second.id)).await.unwrap();

        assert_eq!(repo.list(false, PageRequest::default()).await.unwrap().total, 2);
        let active = repo.list(true, PageRequest::default()).await.unwrap();
        assert_eq!(active.total, 1);
        assert_eq!(active.items[0].patient_id, second.id);

        assert_eq!(repo.list_for_patient(&first.id).await.unwrap().len(), 1);
    }
}
