//! SeaORM implementation of InvoiceRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::warn;

use super::{db_err, new_id, reference, write_err};
use crate::domain::invoice::{
    Invoice, InvoiceChanges, InvoiceItem, InvoiceRepository, InvoiceStatus, InvoiceTotals,
    NewInvoice,
};
use crate::domain::{DomainError, DomainResult, InfraError};
use crate::infrastructure::database::entities::{invoice, payment};
use crate::shared::{PageRequest, PaginatedResult};

const MAX_TAX_RATE_BPS: u32 = 10_000;

pub struct SeaOrmInvoiceRepository {
    db: DatabaseConnection,
}

impl SeaOrmInvoiceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn model_to_domain(m: invoice::Model) -> DomainResult<Invoice> {
    let items: Vec<InvoiceItem> =
        serde_json::from_str(&m.items).map_err(InfraError::Serialization)?;
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(invoice_id = %m.id, status = %m.status, "Unknown stored invoice status");
        InvoiceStatus::Unpaid
    });

    Ok(Invoice {
        status,
        items,
        tax_rate_bps: u32::try_from(m.tax_rate_bps).unwrap_or_default(),
        id: m.id,
        invoice_number: m.invoice_number,
        patient_id: m.patient_id,
        doctor_id: m.doctor_id,
        invoice_date: m.invoice_date,
        due_date: m.due_date,
        subtotal: m.subtotal,
        tax_amount: m.tax_amount,
        total_amount: m.total_amount,
        paid_amount: m.paid_amount,
        notes: m.notes,
        created_by: m.created_by,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<invoice::Model>) -> DomainResult<Vec<Invoice>> {
    models.into_iter().map(model_to_domain).collect()
}

/// Validated totals plus the rate as stored.
fn price(items: &[InvoiceItem], tax_rate_bps: u32) -> DomainResult<(InvoiceTotals, i32)> {
    if tax_rate_bps > MAX_TAX_RATE_BPS {
        return Err(DomainError::Validation("Tax rate cannot exceed 100%".into()));
    }
    if items.is_empty() {
        return Err(DomainError::Validation(
            "An invoice needs at least one item".into(),
        ));
    }
    if items.iter().any(|i| i.unit_price < 0) {
        return Err(DomainError::Validation(
            "Item prices cannot be negative".into(),
        ));
    }
    let totals = InvoiceTotals::compute(items, tax_rate_bps)
        .ok_or_else(|| DomainError::Validation("Invoice amount is too large".into()))?;
    let rate = i32::try_from(tax_rate_bps)
        .map_err(|_| DomainError::Validation("Tax rate cannot exceed 100%".into()))?;
    Ok((totals, rate))
}

#[async_trait]
impl InvoiceRepository for SeaOrmInvoiceRepository {
    async fn create(&self, i: NewInvoice) -> DomainResult<Invoice> {
        let (totals, tax_rate) = price(&i.items, i.tax_rate_bps)?;
        let items = serde_json::to_string(&i.items).map_err(InfraError::Serialization)?;
        let now = Utc::now();
        let status = InvoiceStatus::for_amounts(totals.total_amount, 0);

        let model = invoice::ActiveModel {
            id: Set(new_id()),
            invoice_number: Set(reference("INV", now)),
            patient_id: Set(i.patient_id),
            doctor_id: Set(i.doctor_id),
            invoice_date: Set(i.invoice_date),
            due_date: Set(i.due_date),
            items: Set(items),
            subtotal: Set(totals.subtotal),
            tax_rate_bps: Set(tax_rate),
            tax_amount: Set(totals.tax_amount),
            total_amount: Set(totals.total_amount),
            paid_amount: Set(0),
            status: Set(status.as_str().to_string()),
            notes: Set(i.notes),
            created_by: Set(i.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Invoice", &["invoice_number"]))?;
        model_to_domain(inserted)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Invoice>> {
        let model = invoice::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn list(
        &self,
        status: Option<InvoiceStatus>,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Invoice>> {
        let mut query = invoice::Entity::find();
        if let Some(status) = status {
            query = query.filter(invoice::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(invoice::Column::InvoiceDate)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(models_to_domain(models)?, total, page))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<Invoice>> {
        let models = invoice::Entity::find()
            .filter(invoice::Column::PatientId.eq(patient_id))
            .order_by_desc(invoice::Column::InvoiceDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> DomainResult<Option<Invoice>> {
        let existing = invoice::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };
        let current = model_to_domain(existing.clone())?;

        if current.status == InvoiceStatus::Cancelled {
            return Err(DomainError::Validation(
                "Cannot modify a cancelled invoice".into(),
            ));
        }
        if changes.reprices() && current.paid_amount > 0 {
            return Err(DomainError::Validation(
                "Cannot change the items of an invoice that has payments".into(),
            ));
        }

        let mut active: invoice::ActiveModel = existing.into();
        let reprices = changes.reprices();

        if let Some(v) = changes.due_date {
            active.due_date = Set(Some(v));
        }
        if let Some(v) = changes.notes {
            active.notes = Set(Some(v));
        }
        if reprices {
            let items = changes.items.unwrap_or(current.items);
            let rate = changes.tax_rate_bps.unwrap_or(current.tax_rate_bps);
            let (totals, stored_rate) = price(&items, rate)?;

            active.items = Set(serde_json::to_string(&items).map_err(InfraError::Serialization)?);
            active.subtotal = Set(totals.subtotal);
            active.tax_rate_bps = Set(stored_rate);
            active.tax_amount = Set(totals.tax_amount);
            active.total_amount = Set(totals.total_amount);
            active.status = Set(InvoiceStatus::for_amounts(totals.total_amount, 0)
                .as_str()
                .to_string());
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated).map(Some)
    }

    async fn cancel(&self, id: &str) -> DomainResult<Option<Invoice>> {
        let existing = invoice::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        if existing.status == InvoiceStatus::Cancelled.as_str() {
            return Err(DomainError::Validation("Invoice is already cancelled".into()));
        }
        if existing.paid_amount > 0 {
            return Err(DomainError::Validation(
                "Cannot cancel an invoice that has payments".into(),
            ));
        }

        let mut active: invoice::ActiveModel = existing.into();
        active.status = Set(InvoiceStatus::Cancelled.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated).map(Some)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let payments = payment::Entity::find()
            .filter(payment::Column::InvoiceId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if payments > 0 {
            return Err(DomainError::Validation(
                "Cannot delete an invoice that has payments".into(),
            ));
        }

        let result = invoice::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, "Invoice", &[]))?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Invoice", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::ChargeType;
    use crate::infrastructure::database::repositories::fixtures::{seed_invoice, seed_patient};
    use crate::infrastructure::database::test_database;

    fn dressing() -> InvoiceItem {
        InvoiceItem {
            item_type: ChargeType::Procedure,
            description: "Wound dressing".into(),
            quantity: 3,
            unit_price: 800,
        }
    }

    #[tokio::test]
    async fn create_prices_items_and_numbers_the_invoice() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 10_000).await;

        assert!(invoice.invoice_number.starts_with("INV-"));
        assert_eq!(invoice.subtotal, 10_000);
        assert_eq!(invoice.tax_amount, 1_600);
        assert_eq!(invoice.total_amount, 11_600);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);

        let repo = SeaOrmInvoiceRepository::new(db);
        let listed = repo.list_for_patient(&patient.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].items, invoice.items);

        let unpaid = repo
            .list(Some(InvoiceStatus::Unpaid), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(unpaid.total, 1);
    }

    #[tokio::test]
    async fn unknown_patient_is_a_validation_error() {
        let repo = SeaOrmInvoiceRepository::new(test_database().await);
        let err = repo
            .create(NewInvoice {
                patient_id: "missing".into(),
                doctor_id: None,
                invoice_date: Utc::now(),
                due_date: None,
                items: vec![dressing()],
                tax_rate_bps: 0,
                notes: None,
                created_by: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_reprices_until_cancelled() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 10_000).await;
        let repo = SeaOrmInvoiceRepository::new(db);

        let repriced = repo
            .update(
                &invoice.id,
                InvoiceChanges {
                    items: Some(vec![dressing()]),
                    tax_rate_bps: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(repriced.total_amount, 2_400);
        assert_eq!(repriced.tax_rate_bps, 0);

        let cancelled = repo.cancel(&invoice.id).await.unwrap().unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);
        assert_eq!(cancelled.outstanding(), 0);

        let err = repo
            .update(
                &invoice.id,
                InvoiceChanges {
                    notes: Some("late".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(repo.cancel(&invoice.id).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_unpaid_invoice() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 500).await;
        let repo = SeaOrmInvoiceRepository::new(db);

        repo.delete(&invoice.id).await.unwrap();
        assert!(repo.find_by_id(&invoice.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&invoice.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
