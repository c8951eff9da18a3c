//! Authentication middleware for Axum
//!
//! `auth_middleware` verifies the bearer token on every protected request
//! and stores an `AuthenticatedUser` in the request extensions.
//! `require_roles` then gates a route group on the caller's role.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::ApiError;

/// Legacy header carrying the raw token, accepted after `Authorization`.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

const NO_TOKEN: &str = "No token, authorization denied";
const INVALID_TOKEN: &str = "Token is not valid";

/// Middleware state
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Identity proven by a verified token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))
    }
}

/// `Authorization: Bearer <token>`, else `x-auth-token: <token>`.
///
/// The scheme is matched case-insensitively. A blank value in either header
/// counts as absent.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            let (scheme, token) = h.trim_start().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token)
        });
    let legacy = || {
        headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
    };

    non_blank(bearer).or_else(|| non_blank(legacy()))
}

fn non_blank(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return ApiError::unauthorized(NO_TOKEN).into_response();
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "Rejected token");
            ApiError::unauthorized(INVALID_TOKEN).into_response()
        }
    }
}

/// Role gate. Must run after `auth_middleware`.
///
/// ```ignore
/// router.route_layer(middleware::from_fn_with_state(
///     &[UserRole::Admin, UserRole::Doctor][..],
///     require_roles,
/// ))
/// ```
pub async fn require_roles(
    State(allowed): State<&'static [UserRole]>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return ApiError::unauthorized(NO_TOKEN).into_response();
    };

    if !allowed.contains(&user.role) {
        debug!(username = %user.username, role = %user.role, "Role not permitted");
        let roles: Vec<&str> = allowed.iter().map(UserRole::as_str).collect();
        return ApiError::forbidden(format!(
            "Access denied, requires one of: {}",
            roles.join(", ")
        ))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "middleware-secret".into(),
            expiration_hours: 1,
            issuer: "hmis-test".into(),
        }
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        format!("{}:{}", user.username, user.role)
    }

    fn app() -> Router {
        static PHARMACY_ONLY: &[UserRole] = &[UserRole::Pharmacy];

        let gated = Router::new()
            .route("/gated", get(whoami))
            .route_layer(middleware::from_fn_with_state(PHARMACY_ONLY, require_roles));

        Router::new()
            .route("/me", get(whoami))
            .merge(gated)
            .layer(middleware::from_fn_with_state(
                AuthState { jwt_config: jwt() },
                auth_middleware,
            ))
    }

    async fn call(uri: &str, header: Option<(&str, String)>) -> (StatusCode, String) {
        call_with(uri, header.as_slice()).await
    }

    async fn call_with(uri: &str, headers: &[(&str, String)]) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        let resp = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn missing_token_is_denied() {
        let (status, body) = call("/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(NO_TOKEN));
    }

    #[tokio::test]
    async fn bearer_and_legacy_header_are_both_accepted() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &jwt()).unwrap();

        let (status, body) = call("/me", Some(("authorization", format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice:nurse");

        let (status, _) = call("/me", Some((AUTH_TOKEN_HEADER, token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_scheme_is_case_insensitive() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &jwt()).unwrap();

        for scheme in ["bearer", "BEARER", "BeArEr"] {
            let (status, body) =
                call("/me", Some(("authorization", format!("{} {}", scheme, token)))).await;
            assert_eq!(status, StatusCode::OK, "scheme {}", scheme);
            assert_eq!(body, "alice:nurse");
        }

        let (status, _) = call("/me", Some(("authorization", format!("Basic {}", token)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_bearer_falls_back_to_legacy_header() {
        let token = create_token("u-1", "alice", UserRole::Nurse, &jwt()).unwrap();

        let (status, body) = call_with(
            "/me",
            &[
                ("authorization", "Bearer ".to_string()),
                (AUTH_TOKEN_HEADER, token),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice:nurse");

        let (status, body) = call_with(
            "/me",
            &[
                ("authorization", "Bearer   ".to_string()),
                (AUTH_TOKEN_HEADER, " ".to_string()),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(NO_TOKEN));
    }

    #[tokio::test]
    async fn forged_and_expired_tokens_are_not_valid() {
        let forged = create_token(
            "u-1",
            "alice",
            UserRole::Admin,
            &JwtConfig {
                secret: "attacker".into(),
                ..jwt()
            },
        )
        .unwrap();
        let expired = create_token(
            "u-1",
            "alice",
            UserRole::Admin,
            &JwtConfig {
                expiration_hours: -2,
                ..jwt()
            },
        )
        .unwrap();

        for token in [forged, expired, "garbage".to_string()] {
            let (status, body) =
                call("/me", Some(("authorization", format!("Bearer {}", token)))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.contains(INVALID_TOKEN));
        }
    }

    #[tokio::test]
    async fn role_gate_forbids_other_roles() {
        let nurse = create_token("u-1", "alice", UserRole::Nurse, &jwt()).unwrap();
        let pharmacist = create_token("u-2", "phil", UserRole::Pharmacy, &jwt()).unwrap();

        let (status, _) = call("/gated", Some((AUTH_TOKEN_HEADER, nurse))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call("/gated", Some((AUTH_TOKEN_HEADER, pharmacist))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "phil:pharmacy");
    }
}
