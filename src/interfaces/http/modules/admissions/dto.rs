//! Admission DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::admission::{Admission, NewAdmission};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionDto {
    pub id: String,
    pub patient_id: String,
    pub ward: String,
    pub bed: String,
    pub admitting_doctor_id: Option<String>,
    pub diagnosis: Option<String>,
    /// Minor currency units per started day
    pub daily_bed_rate: i32,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Started days so far (or until discharge), at least one
    pub billable_days: i64,
    /// `billable_days * daily_bed_rate`
    pub bed_charge: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdmissionDto {
    pub fn at(a: Admission, now: DateTime<Utc>) -> Self {
        Self {
            is_active: a.is_active(),
            billable_days: a.billable_days(now),
            bed_charge: a.bed_charge(now),
            id: a.id,
            patient_id: a.patient_id,
            ward: a.ward,
            bed: a.bed,
            admitting_doctor_id: a.admitting_doctor_id,
            diagnosis: a.diagnosis,
            daily_bed_rate: a.daily_bed_rate,
            admission_date: a.admission_date,
            discharge_date: a.discharge_date,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<Admission> for AdmissionDto {
    fn from(a: Admission) -> Self {
        Self::at(a, Utc::now())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdmitPatientRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, max = 100, message = "ward is required"))]
    pub ward: String,
    #[validate(length(min = 1, max = 50, message = "bed is required"))]
    pub bed: String,
    pub admitting_doctor_id: Option<String>,
    pub diagnosis: Option<String>,
    #[validate(range(min = 0, message = "daily_bed_rate must not be negative"))]
    pub daily_bed_rate: i32,
    /// Defaults to now
    pub admission_date: Option<DateTime<Utc>>,
}

impl AdmitPatientRequest {
    pub fn into_new_admission(self, now: DateTime<Utc>) -> NewAdmission {
        NewAdmission {
            patient_id: self.patient_id.trim().to_string(),
            ward: self.ward.trim().to_string(),
            bed: self.bed.trim().to_string(),
            admitting_doctor_id: non_empty(self.admitting_doctor_id),
            diagnosis: non_empty(self.diagnosis),
            daily_bed_rate: self.daily_bed_rate,
            admission_date: self.admission_date.unwrap_or(now),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListAdmissionsParams {
    /// Only admissions without a discharge date
    pub active: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn discharged_stay_reports_its_charge() {
        let admitted = Utc::now() - Duration::days(10);
        let admission = Admission {
            id: "a1".into(),
            patient_id: "p1".into(),
            ward: "Maternity".into(),
            bed: "M-3".into(),
            admitting_doctor_id: None,
            diagnosis: None,
            daily_bed_rate: 2_500,
            admission_date: admitted,
            discharge_date: Some(admitted + Duration::hours(30)),
            created_at: admitted,
            updated_at: admitted,
        };

        let dto = AdmissionDto::at(admission, Utc::now());
        assert!(!dto.is_active);
        assert_eq!(dto.billable_days, 2);
        assert_eq!(dto.bed_charge, 5_000);
    }

    #[test]
    fn negative_bed_rate_is_rejected() {
        let request: AdmitPatientRequest = serde_json::from_value(serde_json::json!({
            "patient_id": "p1",
            "ward": "General",
            "bed": "G-1",
            "daily_bed_rate": -1
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
