use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::decode_unverified;

/// Identity a client reads from its own token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Stored token not inspected yet (first load).
    Unknown,
    Unauthenticated,
    Authenticated(SessionUser),
}

impl AuthState {
    /// Inspect a stored token without the signing secret.
    ///
    /// Missing, malformed and expired tokens all yield `Unauthenticated`.
    pub fn from_stored_token(token: Option<&str>, now: DateTime<Utc>) -> Self {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Unauthenticated;
        };

        let Ok(claims) = decode_unverified(token) else {
            return Self::Unauthenticated;
        };

        if claims.exp <= now.timestamp() {
            return Self::Unauthenticated;
        }

        match Utc.timestamp_opt(claims.exp, 0).single() {
            Some(expires_at) => Self::Authenticated(SessionUser {
                id: claims.sub,
                username: claims.username,
                role: claims.role,
                expires_at,
            }),
            None => Self::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Unauthorized,
    Dashboard,
    Patients,
    Appointments,
    Admissions,
    Pharmacy,
    Laboratory,
    Users,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Unauthorized => "/unauthorized",
            Self::Dashboard => "/dashboard",
            Self::Patients => "/patients",
            Self::Appointments => "/appointments",
            Self::Admissions => "/admissions",
            Self::Pharmacy => "/pharmacy",
            Self::Laboratory => "/laboratory",
            Self::Users => "/users",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show a loading indicator and decide later.
    Loading,
    Redirect(Route),
    Render,
}

/// Decide what to do with a navigation to a route that optionally
/// requires a role. Role matching is exact.
pub fn decide(state: &AuthState, required_role: Option<UserRole>) -> RouteDecision {
    match state {
        AuthState::Unknown => RouteDecision::Loading,
        AuthState::Unauthenticated => RouteDecision::Redirect(Route::Login),
        AuthState::Authenticated(user) => match required_role {
            Some(role) if role != user.role => RouteDecision::Redirect(Route::Unauthorized),
            _ => RouteDecision::Render,
        },
    }
}

/// Where each role lands after signing in.
pub fn landing_route(role: UserRole) -> Route {
    match role {
        UserRole::Admin => Route::Users,
        UserRole::Doctor => Route::Appointments,
        UserRole::Nurse => Route::Admissions,
        UserRole::Frontdesk => Route::Patients,
        UserRole::Pharmacy => Route::Pharmacy,
        UserRole::Lab => Route::Laboratory,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};

    fn token(role: UserRole, hours: i64) -> String {
        let config = JwtConfig {
            secret: "server-only".into(),
            expiration_hours: hours,
            issuer: "hmis-test".into(),
        };
        create_token("u-1", "alice", role, &config).unwrap()
    }

    #[test]
    fn unknown_state_waits() {
        assert_eq!(decide(&AuthState::Unknown, None), RouteDecision::Loading);
        assert_eq!(
            decide(&AuthState::Unknown, Some(UserRole::Admin)),
            RouteDecision::Loading
        );
    }

    #[test]
    fn missing_or_garbage_token_redirects_to_login() {
        let now = Utc::now();
        for stored in [None, Some(""), Some("not.a.jwt")] {
            let state = AuthState::from_stored_token(stored, now);
            assert_eq!(state, AuthState::Unauthenticated);
            assert_eq!(decide(&state, None), RouteDecision::Redirect(Route::Login));
        }
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let stale = token(UserRole::Nurse, 1);
        let later = Utc::now() + Duration::hours(2);
        assert_eq!(
            AuthState::from_stored_token(Some(&stale), later),
            AuthState::Unauthenticated
        );
    }

    #[test]
    fn role_mismatch_redirects_to_unauthorized() {
        let state = AuthState::from_stored_token(Some(&token(UserRole::Nurse, 1)), Utc::now());
        assert_eq!(state.user().map(|u| u.role), Some(UserRole::Nurse));

        assert_eq!(decide(&state, None), RouteDecision::Render);
        assert_eq!(decide(&state, Some(UserRole::Nurse)), RouteDecision::Render);
        assert_eq!(
            decide(&state, Some(UserRole::Admin)),
            RouteDecision::Redirect(Route::Unauthorized)
        );
    }

    #[test]
    fn every_role_has_a_distinct_landing_route() {
        let mut paths: Vec<_> = UserRole::ALL
            .iter()
            .map(|r| landing_route(*r).path())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), UserRole::ALL.len());
    }
}
