use thiserror::Error;

use crate::domain::{DomainError, InfraError};
use crate::infrastructure::crypto::jwt::TokenError;

/// Outcomes of the authentication contract.
///
/// Messages are client-facing. `Internal` carries the underlying failure for
/// logging but displays a generic message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    #[error("User not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(#[source] InfraError),
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict {
                field: "username", ..
            } => Self::UsernameTaken,
            DomainError::Conflict { field: "email", .. } => Self::EmailTaken,
            e @ DomainError::Conflict { .. } => Self::Validation(e.to_string()),
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::Infra(e) => Self::Internal(e),
        }
    }
}

impl From<InfraError> for AuthError {
    fn from(err: InfraError) -> Self {
        Self::Internal(err)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Internal(InfraError::Crypto(format!("Failed to create token: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_conflicts_map_to_duplicate_errors() {
        let username = DomainError::Conflict {
            entity: "User",
            field: "username",
        };
        let email = DomainError::Conflict {
            entity: "User",
            field: "email",
        };

        assert!(matches!(AuthError::from(username), AuthError::UsernameTaken));
        assert!(matches!(AuthError::from(email), AuthError::EmailTaken));
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = AuthError::from(InfraError::Crypto("bcrypt exploded".into()));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
