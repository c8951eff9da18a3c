//! Invoice entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub patient_id: String,
    #[sea_orm(nullable)]
    pub doctor_id: Option<String>,
    pub invoice_date: DateTimeUtc,
    #[sea_orm(nullable)]
    pub due_date: Option<Date>,
    /// JSON array of invoice items
    #[sea_orm(column_type = "Text")]
    pub items: String,
    pub subtotal: i64,
    pub tax_rate_bps: i32,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    /// unpaid, partial, paid, cancelled
    pub status: String,
    #[sea_orm(nullable)]
    pub notes: Option<String>,
    #[sea_orm(nullable)]
    pub created_by: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patient::Entity",
        from = "Column::PatientId",
        to = "super::patient::Column::Id"
    )]
    Patient,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::patient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
