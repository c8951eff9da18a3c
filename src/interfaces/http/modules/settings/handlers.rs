//! Setting API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use super::dto::{is_valid_key, SettingDto, UpsertSettingRequest};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    non_empty, ApiError, ApiResponse, ListResponse, RepoState, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::MessageResponse;

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All settings by key", body = ListResponse<SettingDto>)
    )
)]
pub async fn list_settings(
    State(state): State<RepoState>,
) -> Result<Json<ListResponse<SettingDto>>, ApiError> {
    let settings = state.repos.settings().list().await?;
    Ok(Json(ListResponse::new(settings)))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting", body = ApiResponse<SettingDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_setting(
    State(state): State<RepoState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<SettingDto>>, ApiError> {
    let setting = state
        .repos
        .settings()
        .get(&key)
        .await?
        .ok_or_else(|| DomainError::not_found("Setting", "key", &key))?;
    Ok(Json(ApiResponse::success(setting.into())))
}

#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = ApiResponse<SettingDto>),
        (status = 400, description = "Invalid key or value"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn upsert_setting(
    State(state): State<RepoState>,
    caller: AuthenticatedUser,
    Path(key): Path<String>,
    ValidatedJson(request): ValidatedJson<UpsertSettingRequest>,
) -> Result<Json<ApiResponse<SettingDto>>, ApiError> {
    if !is_valid_key(&key) {
        return Err(ApiError::bad_request(
            "Setting keys may only contain letters, digits, '.', '_' and '-' (max 100)",
        ));
    }

    let setting = state
        .repos
        .settings()
        .upsert(&key, &request.value, non_empty(request.description))
        .await?;
    info!(key = %setting.key, by = %caller.username, "Setting updated");
    Ok(Json(ApiResponse::success(setting.into())))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{key}",
    tag = "Settings",
    security(("bearer_auth" = [])),
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_setting(
    State(state): State<RepoState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.repos.settings().delete(&key).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Setting deleted successfully",
    ))))
}
