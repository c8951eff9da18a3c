//! Migration to create medications table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Medications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Medications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Medications::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Medications::GenericName).string_len(100).null())
                    .col(ColumnDef::new(Medications::Category).string_len(50).null())
                    .col(ColumnDef::new(Medications::Form).string_len(50).null())
                    .col(ColumnDef::new(Medications::Strength).string_len(50).null())
                    .col(ColumnDef::new(Medications::Manufacturer).string_len(100).null())
                    .col(ColumnDef::new(Medications::Description).text().null())
                    .col(
                        ColumnDef::new(Medications::StockQuantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Medications::ReorderLevel)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(Medications::UnitPrice)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Medications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Medications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_medications_name")
                    .table(Medications::Table)
                    .col(Medications::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Medications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Medications {
    Table,
    Id,
    Name,
    GenericName,
    Category,
    Form,
    Strength,
    Manufacturer,
    Description,
    StockQuantity,
    ReorderLevel,
    UnitPrice,
    CreatedAt,
    UpdatedAt,
}
