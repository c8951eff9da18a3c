//! Appointment API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{AppointmentDto, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ListParams, ListResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::modules::auth::MessageResponse;

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "Appointments by date", body = PaginatedResponse<AppointmentDto>)
    )
)]
pub async fn list_appointments(
    State(state): State<RepoState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<AppointmentDto>>, ApiError> {
    let result = state.repos.appointments().list(params.page()).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = ApiResponse<AppointmentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_appointment(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AppointmentDto>>, ApiError> {
    let appointment = state
        .repos
        .appointments()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Appointment", "id", &id))?;
    Ok(Json(ApiResponse::success(appointment.into())))
}

#[utoipa::path(
    get,
    path = "/api/appointments/patient/{patient_id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's appointments", body = ListResponse<AppointmentDto>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn list_patient_appointments(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<AppointmentDto>>, ApiError> {
    if state.repos.patients().find_by_id(&patient_id).await?.is_none() {
        return Err(DomainError::not_found("Patient", "id", patient_id).into());
    }
    let appointments = state
        .repos
        .appointments()
        .list_for_patient(&patient_id)
        .await?;
    Ok(Json(ListResponse::new(appointments)))
}

#[utoipa::path(
    get,
    path = "/api/appointments/doctor/{doctor_id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("doctor_id" = String, Path, description = "Doctor (user) ID")),
    responses(
        (status = 200, description = "The doctor's appointments", body = ListResponse<AppointmentDto>)
    )
)]
pub async fn list_doctor_appointments(
    State(state): State<RepoState>,
    Path(doctor_id): Path<String>,
) -> Result<Json<ListResponse<AppointmentDto>>, ApiError> {
    let appointments = state
        .repos
        .appointments()
        .list_for_doctor(&doctor_id)
        .await?;
    Ok(Json(ListResponse::new(appointments)))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Validation failure or unknown patient/doctor")
    )
)]
pub async fn create_appointment(
    State(state): State<RepoState>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentDto>>), ApiError> {
    let appointment = state.repos.appointments().create(request.into()).await?;
    info!(
        appointment_id = %appointment.id,
        patient_id = %appointment.patient_id,
        doctor_id = %appointment.doctor_id,
        "Appointment booked"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(appointment.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Validation failure or unknown doctor"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_appointment(
    State(state): State<RepoState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentRequest>,
) -> Result<Json<ApiResponse<AppointmentDto>>, ApiError> {
    let appointment = state
        .repos
        .appointments()
        .update(&id, request.into())
        .await?
        .ok_or_else(|| DomainError::not_found("Appointment", "id", &id))?;
    Ok(Json(ApiResponse::success(appointment.into())))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.appointments().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Appointment deleted successfully",
    ))))
}
