//! Insurance claim entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "insurance_claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub claim_number: String,
    pub patient_id: String,
    #[sea_orm(nullable)]
    pub invoice_id: Option<String>,
    pub insurance_provider_id: String,
    #[sea_orm(nullable)]
    pub policy_number: Option<String>,
    pub claim_amount: i64,
    #[sea_orm(nullable)]
    pub approved_amount: Option<i64>,
    /// submitted, approved, rejected, paid
    pub status: String,
    #[sea_orm(nullable)]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub decided_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::insurance_provider::Entity",
        from = "Column::InsuranceProviderId",
        to = "super::insurance_provider::Column::Id"
    )]
    InsuranceProvider,
}

impl Related<super::insurance_provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InsuranceProvider.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
