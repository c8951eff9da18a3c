//! SeaORM implementation of PaymentRepository
//!
//! Every write that changes which payments count towards an invoice
//! recomputes that invoice's paid amount and status in the same
//! transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::warn;

use super::{db_err, new_id, reference, write_err};
use crate::domain::invoice::{
    InvoiceStatus, NewPayment, Payment, PaymentMethod, PaymentRepository, PaymentStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{invoice, payment};

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: payment::Model) -> Payment {
    let method = m.method.parse().unwrap_or_else(|_| {
        warn!(payment_id = %m.id, method = %m.method, "Unknown stored payment method");
        PaymentMethod::Other
    });
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(payment_id = %m.id, status = %m.status, "Unknown stored payment status");
        PaymentStatus::Pending
    });

    Payment {
        method,
        status,
        id: m.id,
        payment_reference: m.payment_reference,
        patient_id: m.patient_id,
        invoice_id: m.invoice_id,
        amount: m.amount,
        transaction_id: m.transaction_id,
        notes: m.notes,
        processed_by: m.processed_by,
        payment_date: m.payment_date,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

async fn load_invoice<C: ConnectionTrait>(conn: &C, id: &str) -> DomainResult<invoice::Model> {
    invoice::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Invoice", "id", id))
}

/// A completed payment must fit inside the outstanding balance.
fn ensure_payable(invoice: &invoice::Model, amount: i64) -> DomainResult<()> {
    if invoice.status == InvoiceStatus::Cancelled.as_str() {
        return Err(DomainError::Validation(
            "Cannot record a payment against a cancelled invoice".into(),
        ));
    }
    let outstanding = (invoice.total_amount - invoice.paid_amount).max(0);
    if amount > outstanding {
        return Err(DomainError::Validation(format!(
            "Payment exceeds the outstanding balance of {}",
            outstanding
        )));
    }
    Ok(())
}

/// Recompute `paid_amount` and status from the completed payments.
async fn settle<C: ConnectionTrait>(conn: &C, invoice_id: &str) -> DomainResult<()> {
    let amounts: Vec<i64> = payment::Entity::find()
        .select_only()
        .column(payment::Column::Amount)
        .filter(payment::Column::InvoiceId.eq(invoice_id))
        .filter(payment::Column::Status.eq(PaymentStatus::Completed.as_str()))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;
    let paid = amounts
        .iter()
        .try_fold(0i64, |acc, amount| acc.checked_add(*amount))
        .ok_or_else(|| DomainError::Validation("Paid amount is too large".into()))?;

    let invoice = load_invoice(conn, invoice_id).await?;
    let status = if invoice.status == InvoiceStatus::Cancelled.as_str() {
        InvoiceStatus::Cancelled
    } else {
        InvoiceStatus::for_amounts(invoice.total_amount, paid)
    };

    let mut active: invoice::ActiveModel = invoice.into();
    active.paid_amount = Set(paid);
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now());
    active.update(conn).await.map_err(db_err)?;
    Ok(())
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn record(&self, p: NewPayment) -> DomainResult<Payment> {
        if p.amount <= 0 {
            return Err(DomainError::Validation(
                "Payment amount must be positive".into(),
            ));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(invoice_id) = p.invoice_id.as_deref() {
            let invoice = load_invoice(&txn, invoice_id).await?;
            if invoice.patient_id != p.patient_id {
                return Err(DomainError::Validation(
                    "Invoice belongs to a different patient".into(),
                ));
            }
            if p.status.settles() {
                ensure_payable(&invoice, p.amount)?;
            } else if invoice.status == InvoiceStatus::Cancelled.as_str() {
                return Err(DomainError::Validation(
                    "Cannot record a payment against a cancelled invoice".into(),
                ));
            }
        }

        let now = Utc::now();
        let model = payment::ActiveModel {
            id: Set(new_id()),
            payment_reference: Set(reference("PAY", now)),
            patient_id: Set(p.patient_id),
            invoice_id: Set(p.invoice_id.clone()),
            amount: Set(p.amount),
            method: Set(p.method.as_str().to_string()),
            status: Set(p.status.as_str().to_string()),
            transaction_id: Set(p.transaction_id),
            notes: Set(p.notes),
            processed_by: Set(p.processed_by),
            payment_date: Set(p.payment_date),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| write_err(e, "Payment", &["payment_reference"]))?;

        if let Some(invoice_id) = p.invoice_id.as_deref() {
            if p.status.settles() {
                settle(&txn, invoice_id).await?;
            }
        }

        txn.commit().await.map_err(db_err)?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>> {
        let model = payment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Payment>> {
        let models = payment::Entity::find()
            .filter(payment::Column::PatientId.eq(patient_id))
            .order_by_desc(payment::Column::PaymentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> DomainResult<Option<Payment>> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = payment::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let current = model_to_domain(existing.clone()).status;
        if current == status {
            return Ok(Some(model_to_domain(existing)));
        }
        if !current.can_transition_to(status) {
            return Err(DomainError::Validation(format!(
                "Cannot change payment status from {} to {}",
                current.as_str(),
                status.as_str()
            )));
        }

        let invoice_id = existing.invoice_id.clone();
        if let Some(invoice_id) = invoice_id.as_deref() {
            if status.settles() {
                let invoice = load_invoice(&txn, invoice_id).await?;
                ensure_payable(&invoice, existing.amount)?;
            }
        }

        let mut active: payment::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(db_err)?;

        if let Some(invoice_id) = invoice_id.as_deref() {
            if current.settles() != status.settles() {
                settle(&txn, invoice_id).await?;
            }
        }

        txn.commit().await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceRepository;
    use crate::infrastructure::database::repositories::fixtures::{seed_invoice, seed_patient};
    use crate::infrastructure::database::repositories::invoice_repository::SeaOrmInvoiceRepository;
    use crate::infrastructure::database::test_database;

    fn cash(patient_id: &str, invoice_id: &str, amount: i64) -> NewPayment {
        NewPayment {
            patient_id: patient_id.into(),
            invoice_id: Some(invoice_id.into()),
            amount,
            method: PaymentMethod::Cash,
            status: PaymentStatus::Completed,
            transaction_id: None,
            notes: None,
            processed_by: Some("u-cashier".into()),
            payment_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn payments_settle_the_invoice() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 10_000).await;
        let payments = SeaOrmPaymentRepository::new(db.clone());
        let invoices = SeaOrmInvoiceRepository::new(db);

        let first = payments
            .record(cash(&patient.id, &invoice.id, 6_000))
            .await
            .unwrap();
        assert!(first.payment_reference.starts_with("PAY-"));

        let partial = invoices.find_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(partial.paid_amount, 6_000);
        assert_eq!(partial.status, InvoiceStatus::Partial);

        let err = payments
            .record(cash(&patient.id, &invoice.id, 5_601))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("5600")));

        payments
            .record(cash(&patient.id, &invoice.id, 5_600))
            .await
            .unwrap();
        let paid = invoices.find_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.outstanding(), 0);

        assert!(invoices.cancel(&invoice.id).await.is_err());
        assert!(invoices.delete(&invoice.id).await.is_err());
    }

    #[tokio::test]
    async fn refund_reopens_the_balance() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 1_000).await;
        let payments = SeaOrmPaymentRepository::new(db.clone());
        let invoices = SeaOrmInvoiceRepository::new(db);

        let payment = payments
            .record(cash(&patient.id, &invoice.id, 1_160))
            .await
            .unwrap();
        let refunded = payments
            .update_status(&payment.id, PaymentStatus::Refunded)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);

        let reopened = invoices.find_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(reopened.paid_amount, 0);
        assert_eq!(reopened.status, InvoiceStatus::Unpaid);

        let err = payments
            .update_status(&payment.id, PaymentStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn pending_payment_counts_only_once_completed() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 1_000).await;
        let payments = SeaOrmPaymentRepository::new(db.clone());
        let invoices = SeaOrmInvoiceRepository::new(db);

        let pending = payments
            .record(NewPayment {
                method: PaymentMethod::Mpesa,
                status: PaymentStatus::Pending,
                transaction_id: Some("QK71XYZ".into()),
                ..cash(&patient.id, &invoice.id, 500)
            })
            .await
            .unwrap();
        let unpaid = invoices.find_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(unpaid.paid_amount, 0);

        payments
            .update_status(&pending.id, PaymentStatus::Completed)
            .await
            .unwrap();
        let partial = invoices.find_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(partial.paid_amount, 500);
        assert_eq!(partial.status, InvoiceStatus::Partial);

        assert_eq!(payments.list_for_patient(&patient.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_or_foreign_invoice_rejects_payment() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let other = seed_patient(&db, "MRN-2").await;
        let invoice = seed_invoice(&db, &patient.id, 1_000).await;
        let payments = SeaOrmPaymentRepository::new(db.clone());

        let err = payments
            .record(cash(&other.id, &invoice.id, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        SeaOrmInvoiceRepository::new(db)
            .cancel(&invoice.id)
            .await
            .unwrap();
        let err = payments
            .record(cash(&patient.id, &invoice.id, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = payments
            .record(cash(&patient.id, "missing", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
