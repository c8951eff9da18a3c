//! User management DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{GetUserDto, UpdateUserDto, UserRole};
use crate::interfaces::http::common::non_empty;
use crate::shared::PageRequest;

/// Update user request; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "first_name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "last_name must be 1-100 characters"))]
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub department: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            email: non_empty(r.email),
            first_name: non_empty(r.first_name),
            last_name: non_empty(r.last_name),
            role: r.role,
            department: non_empty(r.department),
            is_active: None,
        }
    }
}

/// List users query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Substring of username, email, first or last name
    pub search: Option<String>,
    /// Filter by role
    pub role: Option<UserRole>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl From<ListUsersParams> for GetUserDto {
    fn from(p: ListUsersParams) -> Self {
        Self {
            search: non_empty(p.search),
            role: p.role,
            page: PageRequest::new(p.limit, p.offset),
        }
    }
}
