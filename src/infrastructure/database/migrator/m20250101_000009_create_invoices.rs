//! Migration to create invoices table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(50).not_null())
                    .col(ColumnDef::new(Invoices::PatientId).string().not_null())
                    .col(ColumnDef::new(Invoices::DoctorId).string().null())
                    .col(
                        ColumnDef::new(Invoices::InvoiceDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::DueDate).date().null())
                    .col(ColumnDef::new(Invoices::Items).text().not_null().default("[]"))
                    .col(ColumnDef::new(Invoices::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::TaxRateBps).integer().not_null())
                    .col(ColumnDef::new(Invoices::TaxAmount).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::TotalAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::PaidAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(20)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Invoices::Notes).text().null())
                    .col(ColumnDef::new(Invoices::CreatedBy).string().null())
                    .col(
                        ColumnDef::new(Invoices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_patient")
                            .from(Invoices::Table, Invoices::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_doctor")
                            .from(Invoices::Table, Invoices::DoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_invoice_number")
                    .table(Invoices::Table)
                    .col(Invoices::InvoiceNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_patient_id")
                    .table(Invoices::Table)
                    .col(Invoices::PatientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_status")
                    .table(Invoices::Table)
                    .col(Invoices::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    InvoiceNumber,
    PatientId,
    DoctorId,
    InvoiceDate,
    DueDate,
    Items,
    Subtotal,
    TaxRateBps,
    TaxAmount,
    TotalAmount,
    PaidAmount,
    Status,
    Notes,
    CreatedBy,
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
