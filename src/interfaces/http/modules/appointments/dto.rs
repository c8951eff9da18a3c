//! Appointment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::appointment::{
    Appointment, AppointmentChanges, AppointmentStatus, NewAppointment,
};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentDto {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            appointment_date: a.appointment_date,
            status: a.status,
            reason: a.reason,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "doctor_id is required"))]
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    /// Defaults to `scheduled`
    #[serde(default)]
    pub status: AppointmentStatus,
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateAppointmentRequest> for NewAppointment {
    fn from(r: CreateAppointmentRequest) -> Self {
        Self {
            patient_id: r.patient_id.trim().to_string(),
            doctor_id: r.doctor_id.trim().to_string(),
            appointment_date: r.appointment_date,
            status: r.status,
            reason: non_empty(r.reason),
            notes: non_empty(r.notes),
        }
    }
}

/// Absent fields are left unchanged; an appointment never moves to
/// another patient.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateAppointmentRequest {
    #[validate(length(min = 1, message = "doctor_id must not be empty"))]
    pub doctor_id: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl From<UpdateAppointmentRequest> for AppointmentChanges {
    fn from(r: UpdateAppointmentRequest) -> Self {
        Self {
            doctor_id: non_empty(r.doctor_id),
            appointment_date: r.appointment_date,
            status: r.status,
            reason: non_empty(r.reason),
            notes: non_empty(r.notes),
        }
    }
}
