//! SeaORM implementation of InsuranceClaimRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::warn;

use super::{db_err, new_id, reference, write_err};
use crate::domain::invoice::{
    ClaimDecision, ClaimStatus, InsuranceClaim, InsuranceClaimRepository, NewInsuranceClaim,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{insurance_claim, invoice};

pub struct SeaOrmInsuranceClaimRepository {
    db: DatabaseConnection,
}

impl SeaOrmInsuranceClaimRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: insurance_claim::Model) -> InsuranceClaim {
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(claim_id = %m.id, status = %m.status, "Unknown stored claim status");
        ClaimStatus::Submitted
    });

    InsuranceClaim {
        status,
        id: m.id,
        claim_number: m.claim_number,
        patient_id: m.patient_id,
        invoice_id: m.invoice_id,
        insurance_provider_id: m.insurance_provider_id,
        policy_number: m.policy_number,
        claim_amount: m.claim_amount,
        approved_amount: m.approved_amount,
        rejection_reason: m.rejection_reason,
        submitted_at: m.submitted_at,
        decided_at: m.decided_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl InsuranceClaimRepository for SeaOrmInsuranceClaimRepository {
    async fn create(&self, c: NewInsuranceClaim) -> DomainResult<InsuranceClaim> {
        if c.claim_amount <= 0 {
            return Err(DomainError::Validation(
                "Claim amount must be positive".into(),
            ));
        }
        if let Some(invoice_id) = c.invoice_id.as_deref() {
            let invoice = invoice::Entity::find_by_id(invoice_id)
                .one(&self.db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| DomainError::not_found("Invoice", "id", invoice_id))?;
            if invoice.patient_id != c.patient_id {
                return Err(DomainError::Validation(
                    "Invoice belongs to a different patient".into(),
                ));
            }
        }

        let now = Utc::now();
        let model = insurance_claim::ActiveModel {
            id: Set(new_id()),
            claim_number: Set(reference("CLM", now)),
            patient_id: Set(c.patient_id),
            invoice_id: Set(c.invoice_id),
            insurance_provider_id: Set(c.insurance_provider_id),
            policy_number: Set(c.policy_number),
            claim_amount: Set(c.claim_amount),
            approved_amount: Set(None),
            status: Set(ClaimStatus::Submitted.as_str().to_string()),
            rejection_reason: Set(None),
            submitted_at: Set(now),
            decided_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Insurance claim", &["claim_number"]))?;
        Ok(model_to_domain(inserted))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<InsuranceClaim>> {
        let model = insurance_claim::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list_for_patient(&self, patient_id: &str) -> DomainResult<Vec<InsuranceClaim>> {
        let models = insurance_claim::Entity::find()
            .filter(insurance_claim::Column::PatientId.eq(patient_id))
            .order_by_desc(insurance_claim::Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn decide(
        &self,
        id: &str,
        decision: ClaimDecision,
    ) -> DomainResult<Option<InsuranceClaim>> {
        let existing = insurance_claim::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let current = model_to_domain(existing.clone()).status;
        if current == decision.status {
            return Ok(Some(model_to_domain(existing)));
        }
        if !current.can_transition_to(decision.status) {
            return Err(DomainError::Validation(format!(
                "Cannot change claim status from {} to {}",
                current.as_str(),
                decision.status.as_str()
            )));
        }

        let now = Utc::now();
        let claimed = existing.claim_amount;
        let mut active: insurance_claim::ActiveModel = existing.into();

        match decision.status {
            ClaimStatus::Approved => {
                let approved = decision.approved_amount.unwrap_or(claimed);
                if !(0..=claimed).contains(&approved) {
                    return Err(DomainError::Validation(
                        "Approved amount must be between 0 and the claimed amount".into(),
                    ));
                }
                active.approved_amount = Set(Some(approved));
                active.decided_at = Set(Some(now));
            }
            ClaimStatus::Rejected => {
                active.approved_amount = Set(None);
                active.rejection_reason = Set(decision.rejection_reason);
                active.decided_at = Set(Some(now));
            }
            ClaimStatus::Submitted | ClaimStatus::Paid => {}
        }
        active.status = Set(decision.status.as_str().to_string());
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(updated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::insurance::{InsuranceProviderRepository, NewInsuranceProvider};
    use crate::infrastructure::database::repositories::fixtures::{seed_invoice, seed_patient};
    use crate::infrastructure::database::repositories::insurance_repository::SeaOrmInsuranceProviderRepository;
    use crate::infrastructure::database::test_database;

    async fn seed_insurer(db: &DatabaseConnection) -> String {
        SeaOrmInsuranceProviderRepository::new(db.clone())
            .create(NewInsuranceProvider {
                name: "National Health Fund".into(),
                code: Some("NHF".into()),
                contact_phone: None,
                contact_email: None,
            })
            .await
            .unwrap()
            .id
    }

    fn decision(status: ClaimStatus, approved_amount: Option<i64>) -> ClaimDecision {
        ClaimDecision {
            status,
            approved_amount,
            rejection_reason: None,
        }
    }

    #[tokio::test]
    async fn approval_defaults_to_claimed_amount_and_is_capped() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let invoice = seed_invoice(&db, &patient.id, 10_000).await;
        let insurer = seed_insurer(&db).await;
        let repo = SeaOrmInsuranceClaimRepository::new(db);

        let new_claim = || NewInsuranceClaim {
            patient_id: patient.id.clone(),
            invoice_id: Some(invoice.id.clone()),
            insurance_provider_id: insurer.clone(),
            policy_number: Some("POL-778".into()),
            claim_amount: 8_000,
        };

        let claim = repo.create(new_claim()).await.unwrap();
        assert!(claim.claim_number.starts_with("CLM-"));
        assert_eq!(claim.status, ClaimStatus::Submitted);

        let err = repo
            .decide(&claim.id, decision(ClaimStatus::Approved, Some(9_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let approved = repo
            .decide(&claim.id, decision(ClaimStatus::Approved, None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.approved_amount, Some(8_000));
        assert!(approved.decided_at.is_some());

        let paid = repo
            .decide(&claim.id, decision(ClaimStatus::Paid, None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, ClaimStatus::Paid);
        assert_eq!(paid.approved_amount, Some(8_000));

        let second = repo.create(new_claim()).await.unwrap();
        let rejected = repo
            .decide(
                &second.id,
                ClaimDecision {
                    status: ClaimStatus::Rejected,
                    approved_amount: None,
                    rejection_reason: Some("Policy lapsed".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Policy lapsed"));
        assert!(repo
            .decide(&second.id, decision(ClaimStatus::Approved, None))
            .await
            .is_err());

        assert_eq!(repo.list_for_patient(&patient.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_insurer_is_a_validation_error() {
        let db = test_database().await;
        let patient = seed_patient(&db, "MRN-1").await;
        let repo = SeaOrmInsuranceClaimRepository::new(db);

        let err = repo
            .create(NewInsuranceClaim {
                patient_id: patient.id,
                invoice_id: None,
                insurance_provider_id: "missing".into(),
                policy_number: None,
                claim_amount: 100,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
