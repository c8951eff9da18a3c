//! Invoice domain entity
//!
//! Amounts are integer minor currency units. Tax rates are basis points
//! (1600 = 16%).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Settlement status for an invoice that is not cancelled.
    pub fn for_amounts(total: i64, paid: i64) -> Self {
        if paid >= total {
            Self::Paid
        } else if paid > 0 {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Invalid invoice status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChargeType {
    Consultation,
    Medication,
    Procedure,
    Laboratory,
    Bed,
    #[default]
    Other,
}

/// One billed line. Stored as JSON on the invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItem {
    #[serde(default)]
    pub item_type: ChargeType,
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
}

impl InvoiceItem {
    pub fn line_total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total_amount: i64,
}

impl InvoiceTotals {
    /// Tax is rounded half up to the nearest minor unit. `None` on overflow.
    pub fn compute(items: &[InvoiceItem], tax_rate_bps: u32) -> Option<Self> {
        let subtotal = items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.line_total()?))?;
        let tax_amount = subtotal
            .checked_mul(i64::from(tax_rate_bps))?
            .checked_add(5_000)?
            / 10_000;
        let total_amount = subtotal.checked_add(tax_amount)?;

        Some(Self {
            subtotal,
            tax_amount,
            total_amount,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: String,
    /// Human-facing `INV-` reference, unique.
    pub invoice_number: String,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub subtotal: i64,
    pub tax_rate_bps: u32,
    pub tax_amount: i64,
    pub total_amount: i64,
    /// Sum of completed payments against this invoice.
    pub paid_amount: i64,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn outstanding(&self) -> i64 {
        if self.status == InvoiceStatus::Cancelled {
            return 0;
        }
        (self.total_amount - self.paid_amount).max(0)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.outstanding() > 0 && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub tax_rate_bps: u32,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Absent fields are left unchanged. Items and tax rate can only change
/// while nothing has been paid.
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Option<Vec<InvoiceItem>>,
    pub tax_rate_bps: Option<u32>,
}

impl InvoiceChanges {
    pub fn reprices(&self) -> bool {
        self.items.is_some() || self.tax_rate_bps.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, unit_price: i64) -> InvoiceItem {
        InvoiceItem {
            item_type: ChargeType::Consultation,
            description: "Outpatient consultation".into(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn totals_apply_rounded_tax() {
        let totals = InvoiceTotals::compute(&[line(2, 1_000), line(1, 3)], 1600).unwrap();
        assert_eq!(totals.subtotal, 2_003);
        // 320.48 rounds down
        assert_eq!(totals.tax_amount, 320);
        assert_eq!(totals.total_amount, 2_323);

        let half = InvoiceTotals::compute(&[line(1, 50)], 100).unwrap();
        assert_eq!(half.tax_amount, 1);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        assert!(InvoiceTotals::compute(&[line(u32::MAX, i64::MAX / 2)], 0).is_none());
    }

    #[test]
    fn status_follows_paid_amount() {
        assert_eq!(InvoiceStatus::for_amounts(1_000, 0), InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::for_amounts(1_000, 400), InvoiceStatus::Partial);
        assert_eq!(InvoiceStatus::for_amounts(1_000, 1_000), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::for_amounts(0, 0), InvoiceStatus::Paid);
    }

    #[test]
    fn item_type_defaults_to_other() {
        let item: InvoiceItem =
            serde_json::from_str(r#"{"description":"Dressing","quantity":1,"unit_price":500}"#)
                .unwrap();
        assert_eq!(item.item_type, ChargeType::Other);
    }
}
