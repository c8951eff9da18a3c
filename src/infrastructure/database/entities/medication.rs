//! Medication entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(nullable)]
    pub generic_name: Option<String>,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    #[sea_orm(nullable)]
    pub form: Option<String>,
    #[sea_orm(nullable)]
    pub strength: Option<String>,
    #[sea_orm(nullable)]
    pub manufacturer: Option<String>,
    #[sea_orm(nullable, column_type = "Text")]
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    /// Minor currency units
    pub unit_price: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
