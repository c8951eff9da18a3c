//! Migration to create insurance_providers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InsuranceProviders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InsuranceProviders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InsuranceProviders::Name).string_len(100).not_null())
                    .col(ColumnDef::new(InsuranceProviders::Code).string_len(20).null())
                    .col(ColumnDef::new(InsuranceProviders::ContactPhone).string_len(20).null())
                    .col(ColumnDef::new(InsuranceProviders::ContactEmail).string_len(100).null())
                    .col(
                        ColumnDef::new(InsuranceProviders::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(InsuranceProviders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InsuranceProviders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_insurance_providers_name")
                    .table(InsuranceProviders::Table)
                    .col(InsuranceProviders::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InsuranceProviders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InsuranceProviders {
    Table,
    Id,
    Name,
    Code,
    ContactPhone,
    ContactEmail,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
