//! Authentication API handlers
//!
//! Thin wrappers over `AuthService`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    UserProfile,
};
use crate::application::AuthService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub service: Arc<AuthService>,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing fields, invalid role or duplicate username/email"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let result = state.service.register(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(result.into())),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let result = state
        .service
        .login(request.username.trim(), &request.password)
        .await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_profile(
    State(state): State<AuthHandlerState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.service.get_profile(&user.user_id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Current password is incorrect"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .service
        .change_password(
            &user.username,
            &request.current_password,
            &request.new_password,
        )
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password changed successfully",
    ))))
}
