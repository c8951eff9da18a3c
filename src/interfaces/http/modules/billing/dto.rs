//! Billing DTOs: invoices, payments and insurance claims
//!
//! All amounts are integer minor currency units.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::invoice::{
    ClaimDecision, ClaimStatus, InsuranceClaim, Invoice, InvoiceChanges, InvoiceItem,
    InvoiceStatus, NewInsuranceClaim, NewInvoice, NewPayment, Payment, PaymentMethod,
    PaymentStatus, DEFAULT_TAX_RATE_BPS,
};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDto {
    pub id: String,
    pub invoice_number: String,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub subtotal: i64,
    /// Basis points, 1600 = 16%
    pub tax_rate_bps: u32,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub outstanding_amount: i64,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceDto {
    fn from(i: Invoice) -> Self {
        let outstanding_amount = i.outstanding();
        Self {
            id: i.id,
            invoice_number: i.invoice_number,
            patient_id: i.patient_id,
            doctor_id: i.doctor_id,
            invoice_date: i.invoice_date,
            due_date: i.due_date,
            items: i.items,
            subtotal: i.subtotal,
            tax_rate_bps: i.tax_rate_bps,
            tax_amount: i.tax_amount,
            total_amount: i.total_amount,
            paid_amount: i.paid_amount,
            outstanding_amount,
            status: i.status,
            notes: i.notes,
            created_by: i.created_by,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Shared by create and update so both report the same messages.
pub fn check_items(items: &[InvoiceItem]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("At least one item is required");
    }
    for item in items {
        if item.description.trim().is_empty() {
            return Err("Each item requires a description");
        }
        if item.quantity < 1 {
            return Err("Item quantity must be at least 1");
        }
        if item.unit_price < 0 {
            return Err("Item unit_price must be non-negative");
        }
    }
    Ok(())
}

fn validate_items(items: &[InvoiceItem]) -> Result<(), ValidationError> {
    check_items(items)
        .map_err(|message| ValidationError::new("items").with_message(Cow::Borrowed(message)))
}

fn clean_items(items: Vec<InvoiceItem>) -> Vec<InvoiceItem> {
    items
        .into_iter()
        .map(|item| InvoiceItem {
            description: item.description.trim().to_string(),
            ..item
        })
        .collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    pub doctor_id: Option<String>,
    /// Defaults to now
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom(function = "validate_items"))]
    pub items: Vec<InvoiceItem>,
    /// Defaults to 1600 (16%)
    #[validate(range(max = 10000, message = "tax_rate_bps must be between 0 and 10000"))]
    pub tax_rate_bps: Option<u32>,
    pub notes: Option<String>,
}

impl CreateInvoiceRequest {
    pub fn into_new_invoice(self, caller_id: &str, now: DateTime<Utc>) -> NewInvoice {
        NewInvoice {
            patient_id: self.patient_id.trim().to_string(),
            doctor_id: non_empty(self.doctor_id),
            invoice_date: self.invoice_date.unwrap_or(now),
            due_date: self.due_date,
            items: clean_items(self.items),
            tax_rate_bps: self.tax_rate_bps.unwrap_or(DEFAULT_TAX_RATE_BPS),
            notes: non_empty(self.notes),
            created_by: Some(caller_id.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateInvoiceRequest {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Replaces every line. Only allowed while nothing has been paid.
    pub items: Option<Vec<InvoiceItem>>,
    #[validate(range(max = 10000, message = "tax_rate_bps must be between 0 and 10000"))]
    pub tax_rate_bps: Option<u32>,
}

impl UpdateInvoiceRequest {
    pub fn into_changes(self) -> Result<InvoiceChanges, &'static str> {
        if let Some(items) = &self.items {
            check_items(items)?;
        }
        Ok(InvoiceChanges {
            due_date: self.due_date,
            notes: self.notes.map(|n| n.trim().to_string()),
            items: self.items.map(clean_items),
            tax_rate_bps: self.tax_rate_bps,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListInvoicesParams {
    pub status: Option<InvoiceStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentDto {
    pub id: String,
    pub payment_reference: String,
    pub patient_id: String,
    pub invoice_id: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub processed_by: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            payment_reference: p.payment_reference,
            patient_id: p.patient_id,
            invoice_id: p.invoice_id,
            amount: p.amount,
            method: p.method,
            status: p.status,
            transaction_id: p.transaction_id,
            notes: p.notes,
            processed_by: p.processed_by,
            payment_date: p.payment_date,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    pub invoice_id: Option<String>,
    #[validate(range(min = 1, message = "amount must be a positive integer"))]
    pub amount: i64,
    pub method: PaymentMethod,
    /// `pending` or `completed` (default)
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100, message = "transaction_id must be at most 100 characters"))]
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    /// Defaults to now
    pub payment_date: Option<DateTime<Utc>>,
}

impl RecordPaymentRequest {
    pub fn into_new_payment(
        self,
        caller_id: &str,
        now: DateTime<Utc>,
    ) -> Result<NewPayment, &'static str> {
        let status = self.status.unwrap_or_default();
        if !matches!(status, PaymentStatus::Pending | PaymentStatus::Completed) {
            return Err("New payments must be pending or completed");
        }
        Ok(NewPayment {
            patient_id: self.patient_id.trim().to_string(),
            invoice_id: non_empty(self.invoice_id),
            amount: self.amount,
            method: self.method,
            status,
            transaction_id: non_empty(self.transaction_id),
            notes: non_empty(self.notes),
            processed_by: Some(caller_id.to_string()),
            payment_date: self.payment_date.unwrap_or(now),
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InsuranceClaimDto {
    pub id: String,
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

impl From<InsuranceClaim> for InsuranceClaimDto {
    fn from(c: InsuranceClaim) -> Self {
        Self {
            id: c.id,
            claim_number: c.claim_number,
            patient_id: c.patient_id,
            invoice_id: c.invoice_id,
            insurance_provider_id: c.insurance_provider_id,
            policy_number: c.policy_number,
            claim_amount: c.claim_amount,
            approved_amount: c.approved_amount,
            status: c.status,
            rejection_reason: c.rejection_reason,
            submitted_at: c.submitted_at,
            decided_at: c.decided_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClaimRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    pub invoice_id: Option<String>,
    #[validate(length(min = 1, message = "insurance_provider_id is required"))]
    pub insurance_provider_id: String,
    #[validate(length(max = 50, message = "policy_number must be at most 50 characters"))]
    pub policy_number: Option<String>,
    #[validate(range(min = 1, message = "claim_amount must be a positive integer"))]
    pub claim_amount: i64,
}

impl From<CreateClaimRequest> for NewInsuranceClaim {
    fn from(r: CreateClaimRequest) -> Self {
        Self {
            patient_id: r.patient_id.trim().to_string(),
            invoice_id: non_empty(r.invoice_id),
            insurance_provider_id: r.insurance_provider_id.trim().to_string(),
            policy_number: non_empty(r.policy_number),
            claim_amount: r.claim_amount,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClaimStatusRequest {
    pub status: ClaimStatus,
    /// Only read on approval. Defaults to the claimed amount.
    #[validate(range(min = 0, message = "approved_amount must be non-negative"))]
    pub approved_amount: Option<i64>,
    pub rejection_reason: Option<String>,
}

impl From<UpdateClaimStatusRequest> for ClaimDecision {
    fn from(r: UpdateClaimStatusRequest) -> Self {
        Self {
            status: r.status,
            approved_amount: r.approved_amount,
            rejection_reason: non_empty(r.rejection_reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice_request(items: serde_json::Value) -> CreateInvoiceRequest {
        serde_json::from_value(json!({ "patient_id": "p1", "items": items })).unwrap()
    }

    fn consultation(quantity: u32, unit_price: i64) -> serde_json::Value {
        json!({
            "item_type": "consultation",
            "description": " Outpatient consultation ",
            "quantity": quantity,
            "unit_price": unit_price
        })
    }

    #[test]
    fn invoice_needs_valid_lines() {
        let errors = invoice_request(json!([])).validate().unwrap_err();
        let message = errors.field_errors()["items"][0].message.clone().unwrap();
        assert_eq!(message, "At least one item is required");

        assert!(invoice_request(json!([consultation(0, 1_000)])).validate().is_err());
        assert!(invoice_request(json!([consultation(1, -5)])).validate().is_err());
        assert!(invoice_request(json!([consultation(1, 1_000)])).validate().is_ok());
    }

    #[test]
    fn invoice_defaults_tax_and_author() {
        let now = Utc::now();
        let new = invoice_request(json!([consultation(1, 1_000)])).into_new_invoice("u-9", now);
        assert_eq!(new.tax_rate_bps, DEFAULT_TAX_RATE_BPS);
        assert_eq!(new.created_by.as_deref(), Some("u-9"));
        assert_eq!(new.invoice_date, now);
        assert_eq!(new.items[0].description, "Outpatient consultation");
    }

    #[test]
    fn tax_rate_is_capped_at_one_hundred_percent() {
        let request: CreateInvoiceRequest = serde_json::from_value(json!({
            "patient_id": "p1",
            "items": [consultation(1, 1_000)],
            "tax_rate_bps": 10001
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_rejects_an_emptied_item_list() {
        let request: UpdateInvoiceRequest =
            serde_json::from_value(json!({ "items": [] })).unwrap();
        assert_eq!(
            request.into_changes().unwrap_err(),
            "At least one item is required"
        );

        let notes_only: UpdateInvoiceRequest =
            serde_json::from_value(json!({ "notes": "Paid at reception" })).unwrap();
        assert!(!notes_only.into_changes().unwrap().reprices());
    }

    #[test]
    fn new_payments_cannot_start_refunded() {
        let request = |status: &str| -> RecordPaymentRequest {
            serde_json::from_value(json!({
                "patient_id": "p1",
                "amount": 500,
                "method": "mpesa",
                "status": status
            }))
            .unwrap()
        };
        let now = Utc::now();
        assert!(request("refunded").into_new_payment("u", now).is_err());
        assert!(request("failed").into_new_payment("u", now).is_err());
        let pending = request("pending").into_new_payment("u", now).unwrap();
        assert_eq!(pending.status, PaymentStatus::Pending);
        assert_eq!(pending.method, PaymentMethod::Mpesa);
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let request: RecordPaymentRequest = serde_json::from_value(json!({
            "patient_id": "p1",
            "amount": 0,
            "method": "cash"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
