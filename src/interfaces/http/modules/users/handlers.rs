//! User management API handlers
//!
//! Admin-only endpoints. Delegates to `AuthService` from the
//! application/identity layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{ListUsersParams, UpdateUserRequest};
use crate::interfaces::http::common::{ApiError, ApiResponse, PaginatedResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::auth::{
    AuthHandlerState, MessageResponse, RegisterRequest, UserProfile,
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list", body = PaginatedResponse<UserProfile>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AuthHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<PaginatedResponse<UserProfile>>, ApiError> {
    let result = state.service.list_users(params.into()).await?;
    Ok(Json(PaginatedResponse::from_result(result)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserProfile>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<AuthHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state.service.get_user(&id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserProfile>),
        (status = 400, description = "Missing fields, invalid role or duplicate username/email")
    )
)]
pub async fn create_user(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ApiError> {
    let user = state.service.create_user(request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid field or duplicate email"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<AuthHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state.service.update_user(&id, request.into()).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/activate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User activated", body = ApiResponse<UserProfile>),
        (status = 404, description = "Not found")
    )
)]
pub async fn activate_user(
    State(state): State<AuthHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state.service.set_active(&id, true).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated; issued tokens stay valid until expiry", body = ApiResponse<UserProfile>),
        (status = 400, description = "Cannot deactivate own account"),
        (status = 404, description = "Not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<AuthHandlerState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    if caller.user_id == id {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }
    let user = state.service.set_active(&id, false).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Cannot delete own account or user still referenced"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<AuthHandlerState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if caller.user_id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    state.service.delete_user(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted successfully",
    ))))
}
