//! Prescription API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::dto::{
    CreatePrescriptionRequest, ListPrescriptionsParams, PrescriptionDto,
    UpdatePrescriptionStatusRequest,
};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ListResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::MessageResponse;
use crate::shared::PageRequest;

#[utoipa::path(
    get,
    path = "/api/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(ListPrescriptionsParams),
    responses(
        (status = 200, description = "Prescriptions, newest first", body = PaginatedResponse<PrescriptionDto>)
    )
)]
pub async fn list_prescriptions(
    State(state): State<RepoState>,
    Query(params): Query<ListPrescriptionsParams>,
) -> Result<Json<PaginatedResponse<PrescriptionDto>>, ApiError> {
    let page = PageRequest::new(params.limit, params.offset);
    let result = state.repos.prescriptions().list(params.status, page).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription details", body = ApiResponse<PrescriptionDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_prescription(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PrescriptionDto>>, ApiError> {
    let prescription = state
        .repos
        .prescriptions()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Prescription", "id", &id))?;
    Ok(Json(ApiResponse::success(prescription.into())))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/patient/{patient_id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's prescriptions", body = ListResponse<PrescriptionDto>)
    )
)]
pub async fn list_patient_prescriptions(
    State(state): State<RepoState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListResponse<PrescriptionDto>>, ApiError> {
    let prescriptions = state
        .repos
        .prescriptions()
        .list_for_patient(&patient_id)
        .await?;
    Ok(Json(ListResponse::new(prescriptions)))
}

#[utoipa::path(
    post,
    path = "/api/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 201, description = "Prescription issued as pending", body = ApiResponse<PrescriptionDto>),
        (status = 400, description = "No items, invalid item or unknown patient/doctor"),
        (status = 403, description = "Admin or doctor role required")
    )
)]
pub async fn create_prescription(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PrescriptionDto>>), ApiError> {
    let new_prescription = request.into_new_prescription(&caller.user_id, Utc::now());
    let prescription = state.repos.prescriptions().create(new_prescription).await?;
    info!(
        prescription_id = %prescription.id,
        patient_id = %prescription.patient_id,
        items = prescription.items.len(),
        "Prescription issued"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(prescription.into())),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/prescriptions/{id}/status",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    request_body = UpdatePrescriptionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<PrescriptionDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Admin, doctor or pharmacy role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_prescription_status(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePrescriptionStatusRequest>,
) -> Result<Json<ApiResponse<PrescriptionDto>>, ApiError> {
    let prescriptions = state.repos.prescriptions();
    let current = prescriptions
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Prescription", "id", &id))?;

    if !current.status.can_transition_to(request.status) {
        return Err(ApiError::bad_request(format!(
            "Cannot change prescription status from {} to {}",
            current.status.as_str(),
            request.status.as_str()
        )));
    }

    let prescription = prescriptions
        .update_status(&id, request.status)
        .await?
        .ok_or_else(|| DomainError::not_found("Prescription", "id", &id))?;
    info!(
        prescription_id = %id,
        status = prescription.status.as_str(),
        by = %caller.username,
        "Prescription status changed"
    );
    Ok(Json(ApiResponse::success(prescription.into())))
}

#[utoipa::path(
    delete,
    path = "/api/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Admin or doctor role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_prescription(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.prescriptions().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Prescription deleted successfully",
    ))))
}
