//! Migration to create insurance_claims table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InsuranceClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InsuranceClaims::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InsuranceClaims::ClaimNumber).string_len(50).not_null())
                    .col(ColumnDef::new(InsuranceClaims::PatientId).string().not_null())
                    .col(ColumnDef::new(InsuranceClaims::InvoiceId).string().null())
                    .col(
                        ColumnDef::new(InsuranceClaims::InsuranceProviderId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InsuranceClaims::PolicyNumber).string_len(50).null())
                    .col(ColumnDef::new(InsuranceClaims::ClaimAmount).big_integer().not_null())
                    .col(ColumnDef::new(InsuranceClaims::ApprovedAmount).big_integer().null())
                    .col(
                        ColumnDef::new(InsuranceClaims::Status)
                            .string_len(20)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(ColumnDef::new(InsuranceClaims::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(InsuranceClaims::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InsuranceClaims::DecidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InsuranceClaims::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InsuranceClaims::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_insurance_claims_patient")
                            .from(InsuranceClaims::Table, InsuranceClaims::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_insurance_claims_invoice")
                            .from(InsuranceClaims::Table, InsuranceClaims::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_insurance_claims_provider")
                            .from(InsuranceClaims::Table, InsuranceClaims::InsuranceProviderId)
                            .to(InsuranceProviders::Table, InsuranceProviders::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_insurance_claims_claim_number")
                    .table(InsuranceClaims::Table)
                    .col(InsuranceClaims::ClaimNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_insurance_claims_patient_id")
                    .table(InsuranceClaims::Table)
                    .col(InsuranceClaims::PatientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InsuranceClaims::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InsuranceClaims {
    Table,
    Id,
    ClaimNumber,
    PatientId,
    InvoiceId,
    InsuranceProviderId,
    PolicyNumber,
    ClaimAmount,
    ApprovedAmount,
    Status,
    RejectionReason,
    SubmittedAt,
    DecidedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
}

#[derive(Iden)]
enum InsuranceProviders {
    Table,
    Id,
}
