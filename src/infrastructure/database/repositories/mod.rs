//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod admission_repository;
pub mod appointment_repository;
pub mod claim_repository;
pub mod insurance_repository;
pub mod invoice_repository;
pub mod medication_repository;
pub mod patient_repository;
pub mod payment_repository;
pub mod prescription_repository;
pub mod repository_provider;
pub mod setting_repository;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr, SqlErr};

use crate::domain::{DomainError, InfraError};

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Infra(InfraError::Database(e))
}

/// Map a failed insert/update/delete.
///
/// Unique violations become `Conflict` on whichever of `unique_fields`
/// the driver message names (SQLite reports `table.column`, PostgreSQL
/// the index name, and both contain the column). Foreign key violations
/// become a validation error. Everything else is infrastructure.
pub(crate) fn write_err(
    e: DbErr,
    entity: &'static str,
    unique_fields: &[&'static str],
) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            match unique_fields.iter().find(|f| msg.contains(**f)) {
                Some(field) => DomainError::Conflict {
                    entity,
                    field: *field,
                },
                None => match unique_fields.first() {
                    Some(field) => DomainError::Conflict {
                        entity,
                        field: *field,
                    },
                    None => db_err(e),
                },
            }
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => DomainError::Validation(format!(
            "{} refers to a record that does not exist or is still in use",
            entity
        )),
        _ => db_err(e),
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Human-facing document number: `PREFIX-YYYYMMDD-XXXXXXXX`.
pub(crate) fn reference(prefix: &str, at: DateTime<Utc>) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}-{}", prefix, at.format("%Y%m%d"), &random[..8])
}

/// `LOWER(column) LIKE '%query%'` with the query's wildcards escaped.
pub(crate) fn ilike<C>(column: C, query: &str) -> SimpleExpr
where
    C: ColumnTrait,
{
    let escaped = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use sea_orm::DatabaseConnection;

    use super::invoice_repository::SeaOrmInvoiceRepository;
    use super::patient_repository::SeaOrmPatientRepository;
    use super::user_repository::UserRepository;
    use crate::domain::invoice::{
        ChargeType, Invoice, InvoiceItem, InvoiceRepository, NewInvoice, DEFAULT_TAX_RATE_BPS,
    };
    use crate::domain::patient::{BloodType, Gender, NewPatient, Patient, PatientRepository};
    use crate::domain::{CreateUserDto, User, UserRepositoryInterface, UserRole};

    pub fn new_patient(mrn: &str, first: &str, last: &str) -> NewPatient {
        NewPatient {
            mrn: mrn.into(),
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            gender: Gender::Female,
            address: None,
            phone: Some("555-0100".into()),
            email: None,
            insurance_provider: None,
            insurance_id: None,
            blood_type: Some(BloodType::ONegative),
            allergies: None,
        }
    }

    pub async fn seed_patient(db: &DatabaseConnection, mrn: &str) -> Patient {
        SeaOrmPatientRepository::new(db.clone())
            .create(new_patient(mrn, "Jane", "Doe"))
            .await
            .unwrap()
    }

    /// One consultation line at `unit_price`, taxed at the default rate.
    pub async fn seed_invoice(db: &DatabaseConnection, patient_id: &str, unit_price: i64) -> Invoice {
        SeaOrmInvoiceRepository::new(db.clone())
            .create(NewInvoice {
                patient_id: patient_id.into(),
                doctor_id: None,
                invoice_date: Utc::now(),
                due_date: None,
                items: vec![InvoiceItem {
                    item_type: ChargeType::Consultation,
                    description: "Specialist consultation".into(),
                    quantity: 1,
                    unit_price,
                }],
                tax_rate_bps: DEFAULT_TAX_RATE_BPS,
                notes: None,
                created_by: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_doctor(db: &DatabaseConnection, username: &str) -> User {
        UserRepository::new(db.clone())
            .create_user(CreateUserDto {
                username: username.into(),
                email: format!("{}@hospital.test", username),
                password_hash: "hash".into(),
                first_name: "Gregory".into(),
                last_name: "House".into(),
                role: UserRole::Doctor,
                department: Some("Medical".into()),
            })
            .await
            .unwrap()
    }
}
