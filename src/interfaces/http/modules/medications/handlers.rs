//! Medication API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{
    CreateMedicationRequest, ListMedicationsParams, MedicationDto, SearchMedicationsParams,
    UpdateMedicationRequest, UpdateStockRequest,
};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    non_empty, ApiError, ApiResponse, PaginatedResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::MessageResponse;
use crate::shared::PageRequest;

#[utoipa::path(
    get,
    path = "/api/medications",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(ListMedicationsParams),
    responses(
        (status = 200, description = "Catalog ordered by name", body = PaginatedResponse<MedicationDto>)
    )
)]
pub async fn list_medications(
    State(state): State<RepoState>,
    Query(params): Query<ListMedicationsParams>,
) -> Result<Json<PaginatedResponse<MedicationDto>>, ApiError> {
    let page = PageRequest::new(params.limit, params.offset);
    let result = state
        .repos
        .medications()
        .list(params.low_stock.unwrap_or(false), page)
        .await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/medications/search",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(SearchMedicationsParams),
    responses(
        (status = 200, description = "Matching medications", body = PaginatedResponse<MedicationDto>),
        (status = 400, description = "Missing search query")
    )
)]
pub async fn search_medications(
    State(state): State<RepoState>,
    Query(params): Query<SearchMedicationsParams>,
) -> Result<Json<PaginatedResponse<MedicationDto>>, ApiError> {
    let Some(q) = non_empty(params.q) else {
        return Err(ApiError::bad_request("Search query is required"));
    };
    let page = PageRequest::new(params.limit, params.offset);
    let result = state.repos.medications().search(&q, page).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/medications/{id}",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Medication ID")),
    responses(
        (status = 200, description = "Medication details", body = ApiResponse<MedicationDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_medication(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MedicationDto>>, ApiError> {
    let medication = state
        .repos
        .medications()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Medication", "id", &id))?;
    Ok(Json(ApiResponse::success(medication.into())))
}

#[utoipa::path(
    post,
    path = "/api/medications",
    tag = "Medications",
    security(("bearer_auth" = [])),
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication added", body = ApiResponse<MedicationDto>),
        (status = 400, description = "Validation failure or duplicate name"),
        (status = 403, description = "Admin or pharmacy role required")
    )
)]
pub async fn create_medication(
    State(state): State<RepoState>,
    ValidatedJson(request): ValidatedJson<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MedicationDto>>), ApiError> {
    let medication = state.repos.medications().create(request.into()).await?;
    info!(
        medication_id = %medication.id,
        name = %medication.name,
        stock = medication.stock_quantity,
        "Medication added"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(medication.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/medications/{id}",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Medication ID")),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = ApiResponse<MedicationDto>),
        (status = 400, description = "Validation failure or duplicate name"),
        (status = 403, description = "Admin or pharmacy role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_medication(
    State(state): State<RepoState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMedicationRequest>,
) -> Result<Json<ApiResponse<MedicationDto>>, ApiError> {
    let medication = state
        .repos
        .medications()
        .update(&id, request.into())
        .await?
        .ok_or_else(|| DomainError::not_found("Medication", "id", &id))?;
    Ok(Json(ApiResponse::success(medication.into())))
}

#[utoipa::path(
    patch,
    path = "/api/medications/{id}/stock",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Medication ID")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<MedicationDto>),
        (status = 400, description = "Missing or conflicting fields, or insufficient stock"),
        (status = 403, description = "Admin or pharmacy role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_medication_stock(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateStockRequest>,
) -> Result<Json<ApiResponse<MedicationDto>>, ApiError> {
    let change = request.change().map_err(ApiError::bad_request)?;
    let medication = state
        .repos
        .medications()
        .update_stock(&id, change)
        .await?
        .ok_or_else(|| DomainError::not_found("Medication", "id", &id))?;
    info!(
        medication_id = %id,
        stock = medication.stock_quantity,
        low_stock = medication.is_low_stock(),
        by = %caller.username,
        "Medication stock updated"
    );
    Ok(Json(ApiResponse::success(medication.into())))
}

#[utoipa::path(
    delete,
    path = "/api/medications/{id}",
    tag = "Medications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Medication ID")),
    responses(
        (status = 200, description = "Medication deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Admin or pharmacy role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_medication(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.medications().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Medication deleted successfully",
    ))))
}
