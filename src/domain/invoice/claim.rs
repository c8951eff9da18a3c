//! Insurance claims raised for a patient's charges

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Submitted,
    Approved,
    Rejected,
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    /// Submitted claims are decided once; approved claims are later paid.
    pub fn can_transition_to(&self, next: ClaimStatus) -> bool {
        match (self, next) {
            (Self::Submitted, Self::Approved | Self::Rejected) => true,
            (Self::Approved, Self::Paid) => true,
            (current, next) => *current == next,
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            other => Err(format!("Invalid claim status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsuranceClaim {
    pub id: String,
    /// Human-facing `CLM-` reference, unique.
    pub claim_number: String,
    pub patient_id: String,
    pub invoice_id: Option<String>,
    pub insurance_provider_id: String,
    pub policy_number: Option<String>,
    pub claim_amount: i64,
    pub approved_amount: Option<i64>,
    pub status: ClaimStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInsuranceClaim {
    pub patient_id: String,
    pub invoice_id: Option<String>,
    pub insurance_provider_id: String,
    pub policy_number: Option<String>,
    pub claim_amount: i64,
}

/// Insurer's answer. `approved_amount` defaults to the claimed amount.
#[derive(Debug, Clone)]
pub struct ClaimDecision {
    pub status: ClaimStatus,
    pub approved_amount: Option<i64>,
    pub rejection_reason: Option<String>,
}
