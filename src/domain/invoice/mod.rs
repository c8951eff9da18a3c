//! Billing aggregate: invoices, the payments that settle them and the
//! insurance claims raised against them.

pub mod claim;
pub mod model;
pub mod payment;
pub mod repository;
pub mod summary;

pub use claim::{ClaimDecision, ClaimStatus, InsuranceClaim, NewInsuranceClaim};
pub use model::{
    ChargeType, Invoice, InvoiceChanges, InvoiceItem, InvoiceStatus, InvoiceTotals, NewInvoice,
    DEFAULT_TAX_RATE_BPS,
};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentStatus};
pub use repository::{InsuranceClaimRepository, InvoiceRepository, PaymentRepository};
pub use summary::BillingSummary;
