//! Insurance provider API handlers
//!
//! Reads are open to every authenticated user; writes are admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{
    CreateInsuranceProviderRequest, InsuranceProviderDto, ListInsuranceParams,
    UpdateInsuranceProviderRequest,
};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    non_empty, ApiError, ApiResponse, ListResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::modules::auth::MessageResponse;

/// Maximum providers returned by the list endpoint.
pub const INSURANCE_LIST_LIMIT: u64 = 20;

#[utoipa::path(
    get,
    path = "/api/insurance",
    tag = "Insurance",
    security(("bearer_auth" = [])),
    params(ListInsuranceParams),
    responses(
        (status = 200, description = "Up to 20 providers by name", body = ListResponse<InsuranceProviderDto>)
    )
)]
pub async fn list_insurance_providers(
    State(state): State<RepoState>,
    Query(params): Query<ListInsuranceParams>,
) -> Result<Json<ListResponse<InsuranceProviderDto>>, ApiError> {
    let search = non_empty(params.search);
    let providers = state
        .repos
        .insurance_providers()
        .list(search.as_deref(), INSURANCE_LIST_LIMIT)
        .await?;
    Ok(Json(ListResponse::new(providers)))
}

#[utoipa::path(
    get,
    path = "/api/insurance/{id}",
    tag = "Insurance",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Insurance provider ID")),
    responses(
        (status = 200, description = "Provider details", body = ApiResponse<InsuranceProviderDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_insurance_provider(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InsuranceProviderDto>>, ApiError> {
    let provider = state
        .repos
        .insurance_providers()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("Insurance provider", "id", &id))?;
    Ok(Json(ApiResponse::success(provider.into())))
}

#[utoipa::path(
    post,
    path = "/api/insurance",
    tag = "Insurance",
    security(("bearer_auth" = [])),
    request_body = CreateInsuranceProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ApiResponse<InsuranceProviderDto>),
        (status = 400, description = "Validation failure or duplicate name"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_insurance_provider(
    State(state): State<RepoState>,
    ValidatedJson(request): ValidatedJson<CreateInsuranceProviderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InsuranceProviderDto>>), ApiError> {
    let provider = state
        .repos
        .insurance_providers()
        .create(request.into())
        .await?;
    info!(provider_id = %provider.id, name = %provider.name, "Insurance provider created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(provider.into()))))
}

#[utoipa::path(
    put,
    path = "/api/insurance/{id}",
    tag = "Insurance",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Insurance provider ID")),
    request_body = UpdateInsuranceProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ApiResponse<InsuranceProviderDto>),
        (status = 400, description = "Validation failure or duplicate name"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_insurance_provider(
    State(state): State<RepoState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateInsuranceProviderRequest>,
) -> Result<Json<ApiResponse<InsuranceProviderDto>>, ApiError> {
    let provider = state
        .repos
        .insurance_providers()
        .update(&id, request.into())
        .await?
        .ok_or_else(|| DomainError::not_found("Insurance provider", "id", &id))?;
    Ok(Json(ApiResponse::success(provider.into())))
}

#[utoipa::path(
    delete,
    path = "/api/insurance/{id}",
    tag = "Insurance",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Insurance provider ID")),
    responses(
        (status = 200, description = "Provider deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_insurance_provider(
    State(state): State<RepoState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.insurance_providers().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Insurance provider deleted successfully",
    ))))
}
