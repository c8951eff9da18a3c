//! Migration to create admissions table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admissions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Admissions::PatientId).string().not_null())
                    .col(ColumnDef::new(Admissions::Ward).string_len(100).not_null())
                    .col(ColumnDef::new(Admissions::Bed).string_len(50).not_null())
                    .col(ColumnDef::new(Admissions::AdmittingDoctorId).string().null())
                    .col(ColumnDef::new(Admissions::Diagnosis).text().null())
                    .col(
                        ColumnDef::new(Admissions::DailyBedRate)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Admissions::AdmissionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Admissions::DischargeDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Admissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Admissions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admissions_patient")
                            .from(Admissions::Table, Admissions::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admissions_doctor")
                            .from(Admissions::Table, Admissions::AdmittingDoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admissions_patient_id")
                    .table(Admissions::Table)
                    .col(Admissions::PatientId)
                    .to_owned(),
            )
            .await?;

        // At most one open stay per patient.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_admissions_one_active \
                 ON admissions (patient_id) WHERE discharge_date IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admissions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Admissions {
    Table,
    Id,
    PatientId,
    Ward,
    Bed,
    AdmittingDoctorId,
    Diagnosis,
    DailyBedRate,
    AdmissionDate,
    DischargeDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
