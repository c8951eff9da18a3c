//! Error to response mapping
//!
//! The single place where application and domain errors become status
//! codes. Infrastructure failures are logged with detail and answered
//! with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::application::AuthError;
use crate::domain::DomainError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    fn internal(source: &dyn std::error::Error) -> Self {
        error!(error = %source, "Request failed with an internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::MissingFields(_)
            | AuthError::Validation(_)
            | AuthError::UsernameTaken
            | AuthError::EmailTaken => Self::bad_request(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::CurrentPasswordIncorrect => Self::unauthorized(err.to_string()),
            AuthError::NotFound => Self::not_found(err.to_string()),
            AuthError::Internal(source) => Self::internal(source),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { entity, .. } => Self::not_found(format!("{} not found", entity)),
            DomainError::Validation(_) | DomainError::Conflict { .. } => {
                Self::bad_request(err.to_string())
            }
            DomainError::Infra(source) => Self::internal(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InfraError;

    #[test]
    fn duplicates_are_bad_requests() {
        let err = ApiError::from(AuthError::UsernameTaken);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Username already exists");

        let err = ApiError::from(DomainError::Conflict {
            entity: "Patient",
            field: "mrn",
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Patient with this mrn already exists");
    }

    #[test]
    fn credential_failures_are_unauthorized() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::AccountInactive,
            AuthError::CurrentPasswordIncorrect,
        ] {
            assert_eq!(ApiError::from(err).status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn infrastructure_detail_is_not_exposed() {
        let err = ApiError::from(DomainError::Infra(InfraError::Crypto(
            "connection refused at 10.0.0.3".into(),
        )));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn not_found_names_the_entity_only() {
        let err = ApiError::from(DomainError::not_found("Patient", "id", "p-42"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Patient not found");
    }
}
