//! Patient API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{CreatePatientRequest, ListPatientsParams, PatientDto, UpdatePatientRequest};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    non_empty, ApiError, ApiResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::modules::auth::MessageResponse;
use crate::shared::PageRequest;

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(ListPatientsParams),
    responses(
        (status = 200, description = "Patients, newest first", body = PaginatedResponse<PatientDto>)
    )
)]
pub async fn list_patients(
    State(state): State<RepoState>,
    Query(params): Query<ListPatientsParams>,
) -> Result<Json<PaginatedResponse<PatientDto>>, ApiError> {
    let page = PageRequest::new(params.limit, params.offset);
    let patients = state.repos.patients();
    let result = match non_empty(params.q) {
        Some(q) => patients.search(&q, page).await?,
        None => patients.list(page).await?,
    };
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/patients/search",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(ListPatientsParams),
    responses(
        (status = 200, description = "Matching patients", body = PaginatedResponse<PatientDto>),
        (status = 400, description = "Empty query")
    )
)]
pub async fn search_patients(
    State(state): State<RepoState>,
    Query(params): Query<ListPatientsParams>,
) -> Result<Json<PaginatedResponse<PatientDto>>, ApiError> {
    let Some(q) = non_empty(params.q) else {
        return Err(ApiError::bad_request("Search query is required"));
    };
    let page = PageRequest::new(params.limit, params.offset);
    let result = state.repos.patients().search(&q, page).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient details", body = ApiResponse<PatientDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_patient(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PatientDto>>, ApiError> {
    let patient = state
        .repos
        .patients()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Patient", "id", &id))?;
    Ok(Json(ApiResponse::success(patient.into())))
}

#[utoipa::path(
    get,
    path = "/api/patients/mrn/{mrn}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("mrn" = String, Path, description = "Medical record number")),
    responses(
        (status = 200, description = "Patient details", body = ApiResponse<PatientDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_patient_by_mrn(
    State(state): State<RepoState>,
    Path(mrn): Path<String>,
) -> Result<Json<ApiResponse<PatientDto>>, ApiError> {
    let patient = state
        .repos
        .patients()
        .find_by_mrn(&mrn)
        .await?
        .ok_or_else(|| DomainError::not_found("Patient", "mrn", &mrn))?;
    Ok(Json(ApiResponse::success(patient.into())))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = ApiResponse<PatientDto>),
        (status = 400, description = "Validation failure or duplicate MRN")
    )
)]
pub async fn create_patient(
    State(state): State<RepoState>,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PatientDto>>), ApiError> {
    let patient = state.repos.patients().create(request.into()).await?;
    info!(patient_id = %patient.id, mrn = %patient.mrn, "Patient registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(patient.into()))))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = ApiResponse<PatientDto>),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_patient(
    State(state): State<RepoState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePatientRequest>,
) -> Result<Json<ApiResponse<PatientDto>>, ApiError> {
    let patient = state
        .repos
        .patients()
        .update(&id, request.into())
        .await?
        .ok_or_else(|| DomainError::not_found("Patient", "id", &id))?;
    Ok(Json(ApiResponse::success(patient.into())))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Patient still referenced by other records"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_patient(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.patients().delete(&id).await?;
    info!(patient_id = %id, "Patient deleted");
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Patient deleted successfully",
    ))))
}
