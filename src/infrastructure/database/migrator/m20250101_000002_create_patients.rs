//! Migration to create patients table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Patients::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Patients::Mrn).string_len(50).not_null())
                    .col(ColumnDef::new(Patients::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Patients::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Patients::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Patients::Gender).string_len(10).not_null())
                    .col(ColumnDef::new(Patients::Address).text().null())
                    .col(ColumnDef::new(Patients::Phone).string_len(20).null())
                    .col(ColumnDef::new(Patients::Email).string_len(100).null())
                    .col(ColumnDef::new(Patients::InsuranceProvider).string_len(100).null())
                    .col(ColumnDef::new(Patients::InsuranceId).string_len(50).null())
                    .col(ColumnDef::new(Patients::BloodType).string_len(5).null())
                    .col(ColumnDef::new(Patients::Allergies).text().null())
                    .col(
                        ColumnDef::new(Patients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Patients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_patients_mrn")
                    .table(Patients::Table)
                    .col(Patients::Mrn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_patients_name")
                    .table(Patients::Table)
                    .col(Patients::LastName)
                    .col(Patients::FirstName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
    Mrn,
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Address,
    Phone,
    Email,
    InsuranceProvider,
    InsuranceId,
    BloodType,
    Allergies,
    CreatedAt,
    UpdatedAt,
}
