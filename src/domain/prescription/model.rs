//! Prescription domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    #[default]
    Pending,
    Dispensed,
    Cancelled,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispensed => "dispensed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only pending prescriptions move; dispensed and cancelled are final.
    pub fn can_transition_to(&self, next: PrescriptionStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Dispensed | Self::Cancelled) => true,
            (current, next) => *current == next,
        }
    }
}

impl FromStr for PrescriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "dispensed" => Ok(Self::Dispensed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Invalid prescription status '{}'", other)),
        }
    }
}

/// One medication line. Stored as JSON on the prescription row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionItem {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub prescription_date: DateTime<Utc>,
    pub status: PrescriptionStatus,
    pub notes: Option<String>,
    pub items: Vec<PrescriptionItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: String,
    pub doctor_id: String,
    pub prescription_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub items: Vec<PrescriptionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_do_not_move() {
        use PrescriptionStatus::*;
        assert!(Pending.can_transition_to(Dispensed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Dispensed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Dispensed));
        assert!(Dispensed.can_transition_to(Dispensed));
    }
}
