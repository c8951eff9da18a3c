//! Medication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::medication::model::DEFAULT_REORDER_LEVEL;
use crate::domain::medication::{Medication, MedicationChanges, NewMedication, StockChange};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MedicationDto {
    pub id: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    /// Minor currency units
    pub unit_price: i64,
    /// Stock at or below the reorder level
    pub low_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Medication> for MedicationDto {
    fn from(m: Medication) -> Self {
        let low_stock = m.is_low_stock();
        Self {
            id: m.id,
            name: m.name,
            generic_name: m.generic_name,
            category: m.category,
            form: m.form,
            strength: m.strength,
            manufacturer: m.manufacturer,
            description: m.description,
            stock_quantity: m.stock_quantity,
            reorder_level: m.reorder_level,
            unit_price: m.unit_price,
            low_stock,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMedicationRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "generic_name must be at most 100 characters"))]
    pub generic_name: Option<String>,
    #[validate(length(max = 50, message = "category must be at most 50 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 50, message = "form must be at most 50 characters"))]
    pub form: Option<String>,
    #[validate(length(max = 50, message = "strength must be at most 50 characters"))]
    pub strength: Option<String>,
    #[validate(length(max = 100, message = "manufacturer must be at most 100 characters"))]
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "stock_quantity must be a non-negative integer"))]
    pub stock_quantity: i32,
    /// Defaults to 10
    #[validate(range(min = 0, message = "reorder_level must be a non-negative integer"))]
    pub reorder_level: Option<i32>,
    #[validate(range(min = 0, message = "unit_price must be non-negative"))]
    pub unit_price: i64,
}

impl From<CreateMedicationRequest> for NewMedication {
    fn from(r: CreateMedicationRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            generic_name: non_empty(r.generic_name),
            category: non_empty(r.category),
            form: non_empty(r.form),
            strength: non_empty(r.strength),
            manufacturer: non_empty(r.manufacturer),
            description: non_empty(r.description),
            stock_quantity: r.stock_quantity,
            reorder_level: r.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            unit_price: r.unit_price,
        }
    }
}

/// Absent fields are left unchanged. Stock moves through the stock endpoint.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateMedicationRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "generic_name must be at most 100 characters"))]
    pub generic_name: Option<String>,
    #[validate(length(max = 50, message = "category must be at most 50 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 50, message = "form must be at most 50 characters"))]
    pub form: Option<String>,
    #[validate(length(max = 50, message = "strength must be at most 50 characters"))]
    pub strength: Option<String>,
    #[validate(length(max = 100, message = "manufacturer must be at most 100 characters"))]
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "reorder_level must be a non-negative integer"))]
    pub reorder_level: Option<i32>,
    #[validate(range(min = 0, message = "unit_price must be non-negative"))]
    pub unit_price: Option<i64>,
}

impl From<UpdateMedicationRequest> for MedicationChanges {
    fn from(r: UpdateMedicationRequest) -> Self {
        Self {
            name: non_empty(r.name),
            generic_name: non_empty(r.generic_name),
            category: non_empty(r.category),
            form: non_empty(r.form),
            strength: non_empty(r.strength),
            manufacturer: non_empty(r.manufacturer),
            description: non_empty(r.description),
            reorder_level: r.reorder_level,
            unit_price: r.unit_price,
        }
    }
}

/// Exactly one of `stock_quantity` (absolute count) or `adjustment`
/// (signed delta).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateStockRequest {
    #[validate(range(min = 0, message = "stock_quantity must be a non-negative integer"))]
    pub stock_quantity: Option<i32>,
    pub adjustment: Option<i32>,
}

impl UpdateStockRequest {
    pub fn change(&self) -> Result<StockChange, &'static str> {
        match (self.stock_quantity, self.adjustment) {
            (Some(quantity), None) => Ok(StockChange::Set(quantity)),
            (None, Some(delta)) => Ok(StockChange::Adjust(delta)),
            _ => Err("Provide either stock_quantity or adjustment"),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListMedicationsParams {
    /// Only entries at or below their reorder level
    pub low_stock: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchMedicationsParams {
    /// Substring of name, generic name, manufacturer or description
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_checks_name_and_amounts() {
        let request: CreateMedicationRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "stock_quantity": -1,
            "unit_price": 250
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("stock_quantity"));
        assert!(!fields.contains_key("unit_price"));
    }

    #[test]
    fn reorder_level_defaults() {
        let request: CreateMedicationRequest = serde_json::from_value(serde_json::json!({
            "name": " Ibuprofen ",
            "stock_quantity": 40,
            "unit_price": 300,
            "form": "  "
        }))
        .unwrap();

        let new: NewMedication = request.into();
        assert_eq!(new.name, "Ibuprofen");
        assert_eq!(new.reorder_level, DEFAULT_REORDER_LEVEL);
        assert_eq!(new.form, None);
    }

    #[test]
    fn stock_request_needs_exactly_one_field() {
        let set = UpdateStockRequest {
            stock_quantity: Some(5),
            adjustment: None,
        };
        assert_eq!(set.change(), Ok(StockChange::Set(5)));

        let adjust = UpdateStockRequest {
            stock_quantity: None,
            adjustment: Some(-2),
        };
        assert_eq!(adjust.change(), Ok(StockChange::Adjust(-2)));

        assert!(UpdateStockRequest::default().change().is_err());
        assert!(UpdateStockRequest {
            stock_quantity: Some(1),
            adjustment: Some(1),
        }
        .change()
        .is_err());
    }
}
