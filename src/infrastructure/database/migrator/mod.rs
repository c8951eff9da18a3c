//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_patients;
mod m20250101_000003_create_appointments;
mod m20250101_000004_create_admissions;
mod m20250101_000005_create_prescriptions;
mod m20250101_000006_create_insurance_providers;
mod m20250101_000007_create_settings;
mod m20250101_000008_create_medications;
mod m20250101_000009_create_invoices;
mod m20250101_000010_create_payments;
mod m20250101_000011_create_insurance_claims;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_patients::Migration),
            Box::new(m20250101_000003_create_appointments::Migration),
            Box::new(m20250101_000004_create_admissions::Migration),
            Box::new(m20250101_000005_create_prescriptions::Migration),
            Box::new(m20250101_000006_create_insurance_providers::Migration),
            Box::new(m20250101_000007_create_settings::Migration),
            Box::new(m20250101_000008_create_medications::Migration),
            Box::new(m20250101_000009_create_invoices::Migration),
            Box::new(m20250101_000010_create_payments::Migration),
            Box::new(m20250101_000011_create_insurance_claims::Migration),
        ]
    }
}
