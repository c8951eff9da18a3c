//! Prescription DTOs

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::prescription::{
    NewPrescription, Prescription, PrescriptionItem, PrescriptionStatus,
};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionDto {
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

impl From<Prescription> for PrescriptionDto {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            patient_id: p.patient_id,
            doctor_id: p.doctor_id,
            prescription_date: p.prescription_date,
            status: p.status,
            notes: p.notes,
            items: p.items,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn item_error(message: &'static str) -> ValidationError {
    ValidationError::new("items").with_message(Cow::Borrowed(message))
}

fn validate_items(items: &[PrescriptionItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(item_error("At least one item is required"));
    }
    for item in items {
        let fields = [&item.medication, &item.dosage, &item.frequency, &item.duration];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(item_error(
                "Each item requires medication, dosage, frequency and duration",
            ));
        }
        if item.quantity < 1 {
            return Err(item_error("Item quantity must be at least 1"));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePrescriptionRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    /// Defaults to the prescribing caller
    pub doctor_id: Option<String>,
    /// Defaults to now
    pub prescription_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_items"))]
    pub items: Vec<PrescriptionItem>,
}

impl CreatePrescriptionRequest {
    pub fn into_new_prescription(self, caller_id: &str, now: DateTime<Utc>) -> NewPrescription {
        NewPrescription {
            patient_id: self.patient_id.trim().to_string(),
            doctor_id: non_empty(self.doctor_id).unwrap_or_else(|| caller_id.to_string()),
            prescription_date: self.prescription_date.unwrap_or(now),
            notes: non_empty(self.notes),
            items: self
                .items
                .into_iter()
                .map(|item| PrescriptionItem {
                    medication: item.medication.trim().to_string(),
                    dosage: item.dosage.trim().to_string(),
                    frequency: item.frequency.trim().to_string(),
                    duration: item.duration.trim().to_string(),
                    quantity: item.quantity,
                    instructions: non_empty(item.instructions),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePrescriptionStatusRequest {
    pub status: PrescriptionStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPrescriptionsParams {
    pub status: Option<PrescriptionStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: serde_json::Value) -> CreatePrescriptionRequest {
        serde_json::from_value(serde_json::json!({
            "patient_id": "p1",
            "items": items
        }))
        .unwrap()
    }

    fn amoxicillin(quantity: u32) -> serde_json::Value {
        serde_json::json!({
            "medication": "Amoxicillin",
            "dosage": "500mg",
            "frequency": "3x daily",
            "duration": "7 days",
            "quantity": quantity
        })
    }

    #[test]
    fn empty_prescription_is_rejected() {
        let errors = request(serde_json::json!([])).validate().unwrap_err();
        let message = errors.field_errors()["items"][0].message.clone().unwrap();
        assert_eq!(message, "At least one item is required");
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(request(serde_json::json!([amoxicillin(0)])).validate().is_err());
        assert!(request(serde_json::json!([amoxicillin(21)])).validate().is_ok());
    }

    #[test]
    fn doctor_defaults_to_caller() {
        let now = Utc::now();
        let new = request(serde_json::json!([amoxicillin(21)])).into_new_prescription("doc-7", now);
        assert_eq!(new.doctor_id, "doc-7");
        assert_eq!(new.prescription_date, now);
        assert_eq!(new.items[0].instructions, None);
    }
}
