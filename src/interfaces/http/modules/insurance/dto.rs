//! Insurance provider DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::insurance::{
    InsuranceProvider, InsuranceProviderChanges, NewInsuranceProvider,
};
use crate::interfaces::http::common::non_empty;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InsuranceProviderDto {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InsuranceProvider> for InsuranceProviderDto {
    fn from(p: InsuranceProvider) -> Self {
        Self {
            id: p.id,
            name: p.name,
            code: p.code,
            contact_phone: p.contact_phone,
            contact_email: p.contact_email,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInsuranceProviderRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 50, message = "code must be at most 50 characters"))]
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
}

impl From<CreateInsuranceProviderRequest> for NewInsuranceProvider {
    fn from(r: CreateInsuranceProviderRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            code: non_empty(r.code),
            contact_phone: non_empty(r.contact_phone),
            contact_email: non_empty(r.contact_email),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateInsuranceProviderRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "code must be at most 50 characters"))]
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateInsuranceProviderRequest> for InsuranceProviderChanges {
    fn from(r: UpdateInsuranceProviderRequest) -> Self {
        Self {
            name: non_empty(r.name),
            code: non_empty(r.code),
            contact_phone: non_empty(r.contact_phone),
            contact_email: non_empty(r.contact_email),
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListInsuranceParams {
    /// Case-insensitive substring of the provider name
    pub search: Option<String>,
}
