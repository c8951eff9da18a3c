use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::warn;

use super::{db_err, new_id, write_err};
use crate::domain::appointment::{
    Appointment, AppointmentChanges, AppointmentRepository, AppointmentStatus, NewAppointment,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::appointment;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmAppointmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmAppointmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: appointment::Model) -> Appointment {
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(appointment_id = %m.id, status = %m.status, "Unknown stored appointment status");
        AppointmentStatus::Scheduled
    });

    Appointment {
        status,
        id: m.id,
        patient_id: m.patient_id,
        doctor_id: m.doctor_id,
        appointment_date: m.appointment_date,
        reason: m.reason,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl AppointmentRepository for SeaOrmAppointmentRepository {
    async fn create(&self, a: NewAppointment) -> DomainResult<Appointment> {
        let now = Utc::now();

        let model = appointment::ActiveModel {
            id: Set(new_id()),
            patient_id: Set(a.patient_id),
            doctor_id: Set(a.doctor_id),
            appointment_date: Set(a.appointment_date),
            status: Set(a.status.as_str().to_string()),
            reason: Set(a.reason),
            notes: Set(a.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Appointment", &[]))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Appointment>> {
        let model = appointment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, page: PageRequest) -> DomainResult<PaginatedResult<Appointment>> {
        let query = appointment::Entity::find();
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_asc(appointment::Column::AppointmentDate)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(model_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Appointment>> {
        let models = appointment::Entity::find()
            .filter(appointment::Column::PatientId.eq(patient_id))
            .order_by_asc(appointment::Column::AppointmentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_for_doctor(&self, doctor_id: &str) -> DomainResult<Vec<Appointment>> {
        let models = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor_id))
            .order_by_asc(appointment::Column::AppointmentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(
        &self,
        id: &str,
        changes: AppointmentChanges,
    ) -> DomainResult<Option<Appointment>> {
        let existing = appointment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: appointment::ActiveModel = existing.into();

        if let Some(v) = changes.doctor_id {
            active.doctor_id = Set(v);
        }
        if let Some(v) = changes.appointment_date {
            active.appointment_date = Set(v);
        }
        if let Some(v) = changes.status {
            active.status = Set(v.as_str().to_string());
        }
        if let Some(v) = changes.reason {
            active.reason = Set(Some(v));
        }
        if let Some(v) = changes.notes {
            active.notes = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Appointment", &[]))?;
        Ok(Some(model_to_domain(updated)))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = appointment::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Appointment", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::infrastructure::database::repositories::fixtures::{seed_doctor, seed_patient};
    use crate::infrastructure::database::test_database;

    fn booking(patient_id: &str, doctor_id: &str, in_hours: i64) -> NewAppointment {
        NewAppointment {
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            appointment_date: Utc::now() + Duration::hours(in_hours),
            status: AppointmentStatus::Scheduled,
            reason: Some("Follow-up".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn lists_soonest_first_and_filters_by_owner() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let other = seed_patient(&db, "MRN-2").await;
        let doctor = seed_doctor(&db, "dr_house").await;
        let repo = SeaOrmAppointmentRepository::new(db);

        repo.create(booking(&patient.id, &doctor.id, 48)).await.unwrap();
        repo.create(booking(&patient.id, &doctor.id, 2)).await.unwrap();
        repo.create(booking(&other.id, &doctor.id, 24)).await.unwrap();

        let page = repo.list(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items[0].appointment_date < page.items[1].appointment_date);

        assert_eq!(repo.list_for_patient(&patient.id).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_doctor(&doctor.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_patient_is_a_validation_error() {
        let db = test_database().await;
        let doctor = seed_doctor(&db, "dr_house").await;
        let repo = SeaOrmAppointmentRepository::new(db);

        let err = repo.create(booking("nope", &doctor.id, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn status_update_round_trips_no_show() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let doctor = seed_doctor(&db, "dr_house").await;
        let repo = SeaOrmAppointmentRepository::new(db);

        let a = repo.create(booking(&patient.id, &doctor.id, 1)).await.unwrap();
        let updated = repo
            .update(
                &a.id,
                AppointmentChanges {
                    status: Some(AppointmentStatus::NoShow),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::NoShow);
        assert_eq!(updated.reason.as_deref(), Some("Follow-up"));

        repo.delete(&a.id).await.unwrap();
        assert!(repo.find_by_id(&a.id).await.unwrap().is_none());
    }
}
