//! Patient DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::patient::{BloodType, Gender, NewPatient, Patient, PatientChanges};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientDto {
    pub id: String,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// Whole years as of today (UTC)
    pub age: u32,
    pub gender: Gender,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Patient> for PatientDto {
    fn from(p: Patient) -> Self {
        let age = p.age_on(Utc::now().date_naive());
        Self {
            id: p.id,
            mrn: p.mrn,
            first_name: p.first_name,
            last_name: p.last_name,
            date_of_birth: p.date_of_birth,
            age,
            gender: p.gender,
            address: p.address,
            phone: p.phone,
            email: p.email,
            insurance_provider: p.insurance_provider,
            insurance_id: p.insurance_id,
            blood_type: p.blood_type,
            allergies: p.allergies,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 50, message = "mrn is required (max 50 characters)"))]
    pub mrn: String,
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    #[validate(length(max = 30, message = "phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(r: CreatePatientRequest) -> Self {
        Self {
            mrn: r.mrn.trim().to_string(),
            first_name: r.first_name.trim().to_string(),
            last_name: r.last_name.trim().to_string(),
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            address: non_empty(r.address),
            phone: non_empty(r.phone),
            email: non_empty(r.email),
            insurance_provider: non_empty(r.insurance_provider),
            insurance_id: non_empty(r.insurance_id),
            blood_type: r.blood_type,
            allergies: non_empty(r.allergies),
        }
    }
}

/// Absent fields are left unchanged. The MRN is immutable.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdatePatientRequest {
    #[validate(length(min = 1, max = 100, message = "first_name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    #[validate(length(max = 30, message = "phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<String>,
}

impl From<UpdatePatientRequest> for PatientChanges {
    fn from(r: UpdatePatientRequest) -> Self {
        Self {
            first_name: non_empty(r.first_name),
            last_name: non_empty(r.last_name),
            date_of_birth: r.date_of_birth,
            gender: r.gender,
            address: non_empty(r.address),
            phone: non_empty(r.phone),
            email: non_empty(r.email),
            insurance_provider: non_empty(r.insurance_provider),
            insurance_id: non_empty(r.insurance_id),
            blood_type: r.blood_type,
            allergies: non_empty(r.allergies),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPatientsParams {
    /// Optional substring of first name, last name or MRN
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_requires_names_and_checks_email() {
        let body = serde_json::json!({
            "mrn": "MRN-1",
            "first_name": "",
            "last_name": "Doe",
            "date_of_birth": "1990-01-01",
            "gender": "male",
            "email": "not-an-email",
            "blood_type": "AB+"
        });
        let request: CreatePatientRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.blood_type, Some(BloodType::AbPositive));

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("mrn"));
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        let changes: PatientChanges = UpdatePatientRequest {
            phone: Some("  ".into()),
            allergies: Some(" penicillin ".into()),
            ..Default::default()
        }
        .into();
        assert_eq!(changes.phone, None);
        assert_eq!(changes.allergies.as_deref(), Some("penicillin"));
    }
}
