//! Per-patient billing roll-up

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ClaimStatus, InsuranceClaim, Invoice, InvoiceStatus};
use crate::domain::admission::Admission;

/// Cancelled invoices and rejected claims are left out of every figure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingSummary {
    pub patient_id: String,
    pub total_billed: i64,
    pub total_paid: i64,
    pub total_outstanding: i64,
    pub total_invoices: u64,
    pub paid_invoices: u64,
    pub partial_invoices: u64,
    pub unpaid_invoices: u64,
    pub overdue_invoices: u64,
    pub insurance_claimed: i64,
    pub insurance_approved: i64,
    /// Bed charges for a stay that has not been discharged yet.
    pub accrued_bed_charges: i64,
}

impl BillingSummary {
    pub fn compute(
        patient_id: &str,
        invoices: &[Invoice],
        claims: &[InsuranceClaim],
        admissions: &[Admission],
        now: DateTime<Utc>,
    ) -> Self {
        let today = now.date_naive();
        let mut summary = Self {
            patient_id: patient_id.to_string(),
            ..Self::default()
        };

        for invoice in invoices {
            match invoice.status {
                InvoiceStatus::Cancelled => continue,
                InvoiceStatus::Paid => summary.paid_invoices += 1,
                InvoiceStatus::Partial => summary.partial_invoices += 1,
                InvoiceStatus::Unpaid => summary.unpaid_invoices += 1,
            }
            if invoice.is_overdue(today) {
                summary.overdue_invoices += 1;
            }
            summary.total_invoices += 1;
            summary.total_billed = summary.total_billed.saturating_add(invoice.total_amount);
            summary.total_paid = summary.total_paid.saturating_add(invoice.paid_amount);
            summary.total_outstanding =
                summary.total_outstanding.saturating_add(invoice.outstanding());
        }

        for claim in claims {
            if claim.status == ClaimStatus::Rejected {
                continue;
            }
            summary.insurance_claimed = summary.insurance_claimed.saturating_add(claim.claim_amount);
            if let Some(approved) = claim.approved_amount {
                summary.insurance_approved = summary.insurance_approved.saturating_add(approved);
            }
        }

        summary.accrued_bed_charges = admissions
            .iter()
            .filter(|a| a.is_active())
            .fold(0i64, |acc, a| acc.saturating_add(a.bed_charge(now)));

        summary
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::invoice::{ChargeType, InvoiceItem};

    fn invoice(total: i64, paid: i64, status: InvoiceStatus, overdue: bool) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: format!("inv-{}-{}", total, paid),
            invoice_number: "INV-1".into(),
            patient_id: "p1".into(),
            doctor_id: None,
            invoice_date: now,
            due_date: overdue.then(|| now.date_naive() - Duration::days(3)),
            items: vec![InvoiceItem {
                item_type: ChargeType::Procedure,
                description: "Suturing".into(),
                quantity: 1,
                unit_price: total,
            }],
            subtotal: total,
            tax_rate_bps: 0,
            tax_amount: 0,
            total_amount: total,
            paid_amount: paid,
            status,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn claim(amount: i64, approved: Option<i64>, status: ClaimStatus) -> InsuranceClaim {
        let now = Utc::now();
        InsuranceClaim {
            id: "c1".into(),
            claim_number: "CLM-1".into(),
            patient_id: "p1".into(),
            invoice_id: None,
            insurance_provider_id: "ins-1".into(),
            policy_number: None,
            claim_amount: amount,
            approved_amount: approved,
            status,
            rejection_reason: None,
            submitted_at: now,
            decided_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ward_stay(admitted: DateTime<Utc>, discharged: Option<DateTime<Utc>>) -> Admission {
        Admission {
            id: "a1".into(),
            patient_id: "p1".into(),
            ward: "General".into(),
            bed: "G-1".into(),
            admitting_doctor_id: None,
            diagnosis: None,
            daily_bed_rate: 2_000,
            admission_date: admitted,
            discharge_date: discharged,
            created_at: admitted,
            updated_at: admitted,
        }
    }

    #[test]
    fn cancelled_invoices_and_rejected_claims_are_ignored() {
        let now = Utc::now();
        let invoices = [
            invoice(10_000, 10_000, InvoiceStatus::Paid, false),
            invoice(5_000, 2_000, InvoiceStatus::Partial, true),
            invoice(1_000, 0, InvoiceStatus::Unpaid, false),
            invoice(9_999, 0, InvoiceStatus::Cancelled, true),
        ];
        let claims = [
            claim(4_000, Some(3_500), ClaimStatus::Approved),
            claim(800, None, ClaimStatus::Submitted),
            claim(7_000, None, ClaimStatus::Rejected),
        ];
        let stays = [
            ward_stay(now - Duration::hours(30), None),
            ward_stay(now - Duration::days(10), Some(now - Duration::days(8))),
        ];

        let summary = BillingSummary::compute("p1", &invoices, &claims, &stays, now);

        assert_eq!(summary.total_invoices, 3);
        assert_eq!(summary.total_billed, 16_000);
        assert_eq!(summary.total_paid, 12_000);
        assert_eq!(summary.total_outstanding, 4_000);
        assert_eq!(
            (summary.paid_invoices, summary.partial_invoices, summary.unpaid_invoices),
            (1, 1, 1)
        );
        assert_eq!(summary.overdue_invoices, 1);
        assert_eq!(summary.insurance_claimed, 4_800);
        assert_eq!(summary.insurance_approved, 3_500);
        assert_eq!(summary.accrued_bed_charges, 4_000);
    }
}
