//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::domain::UserRole;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            expiration_hours: security.jwt_expiration_hours,
            issuer: security.jwt_issuer.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token lifetime of {0} hours is out of range")]
    LifetimeOutOfRange(i64),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl JwtConfig {
    pub fn lifetime(&self) -> Result<Duration, TokenError> {
        Duration::try_hours(self.expiration_hours)
            .ok_or(TokenError::LifetimeOutOfRange(self.expiration_hours))
    }

    pub fn expires_in_seconds(&self) -> Result<i64, TokenError> {
        self.expiration_hours
            .checked_mul(3600)
            .ok_or(TokenError::LifetimeOutOfRange(self.expiration_hours))
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// User role
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(
        user_id: &str,
        username: &str,
        role: UserRole,
        config: &JwtConfig,
    ) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(config.lifetime()?)
            .ok_or(TokenError::LifetimeOutOfRange(config.expiration_hours))?;

        Ok(Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        })
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    username: &str,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let token_claims = TokenClaims::new(user_id, username, role, config)?;

    let token = encode(
        &Header::default(),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify signature, issuer and expiry, then decode.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Decode claims without the signing secret.
///
/// For client-side display and routing only. Nothing returned here is
/// trusted by the server; expiry is left for the caller to check.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    let token_data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "hmis-test".into(),
        }
    }

    #[test]
    fn issued_token_carries_identity() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::Nurse);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..config()
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSignature);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &config()).unwrap();
        let other = JwtConfig {
            issuer: "someone-else".into(),
            ..config()
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidIssuer);
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtConfig {
            expiration_hours: -2,
            ..config()
        };
        let token = create_token("u-1", "alice", UserRole::Doctor, &expired).unwrap();

        let err = verify_token(&token, &config()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpiredSignature);
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let huge = JwtConfig {
            expiration_hours: 10_000_000_000_000_000,
            ..config()
        };

        let err = create_token("u-1", "alice", UserRole::Nurse, &huge).unwrap_err();
        assert!(matches!(err, TokenError::LifetimeOutOfRange(_)));
        assert!(huge.expires_in_seconds().is_err());
        assert_eq!(config().expires_in_seconds().unwrap(), 3600);
    }

    #[test]
    fn unverified_decode_reads_claims_without_secret() {
        let token = create_token("u-9", "bob", UserRole::Lab, &config()).unwrap();
        let claims = decode_unverified(&token).unwrap();

        assert_eq!(claims.username, "bob");
        assert_eq!(claims.role, UserRole::Lab);
    }
}
