//! Admission API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::dto::{AdmissionDto, AdmitPatientRequest, ListAdmissionsParams};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ListResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::modules::auth::MessageResponse;
use crate::shared::PageRequest;

const ALREADY_ADMITTED: &str = "Patient already has an active admission";

#[utoipa::path(
    get,
    path = "/api/admissions",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    params(ListAdmissionsParams),
    responses(
        (status = 200, description = "Admissions, newest first", body = PaginatedResponse<AdmissionDto>),
        (status = 403, description = "Role not permitted")
    )
)]
pub async fn list_admissions(
    State(state): State<RepoState>,
    Query(params): Query<ListAdmissionsParams>,
) -> Result<Json<PaginatedResponse<AdmissionDto>>, ApiError> {
    let page = PageRequest::new(params.limit, params.offset);
    let result = state
        .repos
        .admissions()
        .list(params.active.unwrap_or(false), page)
        .await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/admissions/{id}",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Admission ID")),
    responses(
        (status = 200, description = "Admission details", body = ApiResponse<AdmissionDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_admission(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AdmissionDto>>, ApiError> {
    let admission = state
        .repos
        .admissions()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Admission", "id", &id))?;
    Ok(Json(ApiResponse::success(admission.into())))
}

#[utoipa::path(
    get,
    path = "/api/admissions/patient/{patient_id}",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's admission history", body = ListResponse<AdmissionDto>),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn list_patient_admissions(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<AdmissionDto>>, ApiError> {
    if state.repos.patients().find_by_id(&patient_id).await?.is_none() {
        return Err(DomainError::not_found("Patient", "id", patient_id).into());
    }

    let now = Utc::now();
    let admissions = state
        .repos
        .admissions()
        .list_for_patient(&patient_id)
        .await?
        .into_iter()
        .map(|a| AdmissionDto::at(a, now))
        .collect();
    Ok(Json(ListResponse {
        success: true,
        data: admissions,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admissions",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    request_body = AdmitPatientRequest,
    responses(
        (status = 201, description = "Patient admitted", body = ApiResponse<AdmissionDto>),
        (status = 400, description = "Validation failure or patient already admitted"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn admit_patient(
    State(state): State<RepoState>,
    ValidatedJson(request): ValidatedJson<AdmitPatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdmissionDto>>), ApiError> {
    let now = Utc::now();
    let new_admission = request.into_new_admission(now);

    if state
        .repos
        .patients()
        .find_by_id(&new_admission.patient_id)
        .await?
        .is_none()
    {
        return Err(DomainError::not_found("Patient", "id", new_admission.patient_id).into());
    }

    let admissions = state.repos.admissions();
    if admissions
        .find_active_for_patient(&new_admission.patient_id)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request(ALREADY_ADMITTED));
    }

    let admission = admissions
        .create(new_admission)
        .await
        .map_err(|e| match e {
            DomainError::Conflict { .. } => ApiError::bad_request(ALREADY_ADMITTED),
            other => other.into(),
        })?;
    info!(
        admission_id = %admission.id,
        patient_id = %admission.patient_id,
        ward = %admission.ward,
        bed = %admission.bed,
        "Patient admitted"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AdmissionDto::at(admission, now))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admissions/{id}/discharge",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Admission ID")),
    responses(
        (status = 200, description = "Patient discharged; bed charge is final", body = ApiResponse<AdmissionDto>),
        (status = 400, description = "Already discharged"),
        (status = 404, description = "Not found")
    )
)]
pub async fn discharge_patient(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AdmissionDto>>, ApiError> {
    let admissions = state.repos.admissions();
    let current = admissions
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Admission", "id", &id))?;
    if !current.is_active() {
        return Err(ApiError::bad_request("Patient is already discharged"));
    }

    let now = Utc::now();
    let admission = admissions
        .discharge(&id, now)
        .await?
        .ok_or_else(|| DomainError::not_found("Admission", "id", &id))?;
    let dto = AdmissionDto::at(admission, now);
    info!(
        admission_id = %dto.id,
        patient_id = %dto.patient_id,
        bed_charge = dto.bed_charge,
        "Patient discharged"
    );
    Ok(Json(ApiResponse::success(dto)))
}

#[utoipa::path(
    delete,
    path = "/api/admissions/{id}",
    tag = "Admissions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Admission ID")),
    responses(
        (status = 200, description = "Admission deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_admission(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.admissions().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Admission deleted successfully",
    ))))
}
