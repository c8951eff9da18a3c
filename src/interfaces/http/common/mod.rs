//! Shared HTTP types

mod error;
mod validated_json;

pub use error::ApiError;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::RepositoryProvider;
use crate::shared::{PageRequest, PaginatedResult};

/// Response envelope: `{"success": bool, "data": ..., "error"?: string}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Envelope for list endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn from_result<D>(result: PaginatedResult<D>) -> Self
    where
        T: From<D>,
    {
        let result = result.map(T::from);
        Self {
            success: true,
            data: result.items,
            total: result.total,
            limit: result.limit,
            offset: result.offset,
        }
    }
}

/// Envelope for unpaginated lists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new<D>(items: Vec<D>) -> Self
    where
        T: From<D>,
    {
        Self {
            success: true,
            data: items.into_iter().map(T::from).collect(),
        }
    }
}

/// `?limit=&offset=`; limit defaults to 10 and is clamped to 1..=100.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListParams {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}

/// State for the CRUD resource handlers.
#[derive(Clone)]
pub struct RepoState {
    pub repos: Arc<dyn RepositoryProvider>,
}

/// Trim and drop empty strings from optional request fields.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
