use async_trait::async_trait;

use super::{
    ClaimDecision, InsuranceClaim, Invoice, InvoiceChanges, InvoiceStatus, NewInsuranceClaim,
    NewInvoice, NewPayment, Payment, PaymentStatus,
};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Computes totals from the items and assigns an invoice number.
    async fn create(&self, invoice: NewInvoice) -> DomainResult<Invoice>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Invoice>>;

    /// Newest first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<InvoiceStatus>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Invoice>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Invoice>>;

    /// Cancelled invoices are frozen. Repricing requires a zero paid amount.
    async fn update(&self, id: &str, changes: InvoiceChanges) -> DomainResult<Option<Invoice>>;

    /// Only invoices with nothing paid can be cancelled.
    async fn cancel(&self, id: &str) -> DomainResult<Option<Invoice>>;

    /// Invoices with recorded payments cannot be deleted.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}

/// Payment writes keep the settled invoice's paid amount and status in step,
/// inside one transaction.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// A completed payment may not exceed the invoice's outstanding balance.
    async fn record(&self, payment: NewPayment) -> DomainResult<Payment>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Payment>>;
    async fn update_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> DomainResult<Option<Payment>>;
}

#[async_trait]
pub trait InsuranceClaimRepository: Send + Sync {
    async fn create(&self, claim: NewInsuranceClaim) -> DomainResult<InsuranceClaim>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<InsuranceClaim>>;
    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<InsuranceClaim>>;

    /// Applies the status transition rules and the approved amount cap.
    async fn decide(
        &self,
        id: &str,
        decision: ClaimDecision,
    ) -> DomainResult<Option<InsuranceClaim>>;
}
