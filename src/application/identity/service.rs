//! Authentication service: application-layer orchestration
//!
//! All identity business logic lives here. HTTP handlers are thin wrappers
//! that delegate to this service and map `AuthError` to status codes.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use validator::ValidateEmail;

use super::AuthError;
use crate::config::SeedConfig;
use crate::domain::{
    CreateUserDto, GetUserDto, UpdateUserDto, User, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password_blocking, verify_password_blocking};
use crate::shared::PaginatedResult;

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const DUMMY_PASSWORD: &str = "unknown-account";

/// Issued token plus the account it was issued for.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Input for registration and admin account creation.
///
/// `role` arrives as the wire string so an unknown value is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: Option<String>,
}

/// Orchestrates credential store, password hasher and token issuer.
///
/// Generic over the repository so tests can run against the in-memory
/// store; the HTTP layer uses the `dyn` default.
pub struct AuthService<R: UserRepositoryInterface + ?Sized = dyn UserRepositoryInterface> {
    repo: Arc<R>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    /// Compared against when the username is unknown, at the same cost as
    /// real hashes.
    dummy_hash: OnceCell<String>,
}

impl<R: UserRepositoryInterface + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, jwt_config: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            jwt_config,
            bcrypt_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Create an account and sign a token for it.
    pub async fn register(&self, input: NewAccount) -> Result<AuthResult, AuthError> {
        let user = self.create_account(input).await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "New user registered");
        self.issue(user)
    }

    /// Verify username and password and sign a token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResult, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("Username and password are required"));
        }

        let Some(mut user) = self.repo.get_user_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| hash_password_blocking(DUMMY_PASSWORD.into(), self.bcrypt_cost))
                .await?;
            verify_password_blocking(password.to_string(), dummy.clone()).await?;
            counter!("hmis_auth_logins_total", "outcome" => "invalid_credentials").increment(1);
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            counter!("hmis_auth_logins_total", "outcome" => "inactive").increment(1);
            return Err(AuthError::AccountInactive);
        }

        let valid =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            counter!("hmis_auth_logins_total", "outcome" => "invalid_credentials").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        match self.repo.record_login(&user.id, now).await {
            Ok(()) => user.last_login = Some(now),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to record last login"),
        }

        counter!("hmis_auth_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, username = %user.username, "User logged in");
        self.issue(user)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<User, AuthError> {
        self.repo
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Replace the password after checking the current one.
    ///
    /// Tokens issued before the change stay valid until they expire.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AuthError::MissingFields(
                "Current password and new password are required",
            ));
        }

        let user = self
            .repo
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::NotFound)?;

        let valid =
            verify_password_blocking(current_password.to_string(), user.password_hash).await?;
        if !valid {
            return Err(AuthError::CurrentPasswordIncorrect);
        }

        let new_hash = hash_password_blocking(new_password.to_string(), self.bcrypt_cost).await?;
        self.repo.update_user_password(&user.id, &new_hash).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    // ── Account management (admin) ──────────────────────────────

    pub async fn list_users(&self, dto: GetUserDto) -> Result<PaginatedResult<User>, AuthError> {
        Ok(self.repo.list_users(dto).await?)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_profile(id).await
    }

    /// Same checks as registration, without issuing a token.
    pub async fn create_user(&self, input: NewAccount) -> Result<User, AuthError> {
        let user = self.create_account(input).await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, dto: UpdateUserDto) -> Result<User, AuthError> {
        if let Some(email) = dto.email.as_ref() {
            if !email.validate_email() {
                return Err(AuthError::Validation("Invalid email address".into()));
            }
        }

        self.repo
            .update_user(id, dto)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Toggle `is_active`. Outstanding tokens of a deactivated account are not revoked.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<User, AuthError> {
        let user = self
            .update_user(
                id,
                UpdateUserDto {
                    is_active: Some(active),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user.id, active, "User activation changed");
        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        self.repo.delete_user(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create one account per role when the user table is empty.
    ///
    /// Returns how many accounts were created.
    pub async fn seed_default_users(&self, seed: &SeedConfig) -> Result<usize, AuthError> {
        if self.repo.count_users().await? > 0 {
            return Ok(0);
        }

        let password_hash =
            hash_password_blocking(seed.default_password.clone(), self.bcrypt_cost).await?;

        let mut created = 0;
        for role in UserRole::ALL {
            let (first_name, last_name) = seed_name(role);
            self.repo
                .create_user(CreateUserDto {
                    username: role.as_str().to_string(),
                    email: format!("{}@{}", role.as_str(), seed.email_domain),
                    password_hash: password_hash.clone(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    role,
                    department: Some(role.default_department().to_string()),
                })
                .await?;
            created += 1;
        }

        warn!(
            count = created,
            "Seeded default staff accounts with the configured default password; change them"
        );
        Ok(created)
    }

    // ── Internals ───────────────────────────────────────────────

    async fn create_account(&self, input: NewAccount) -> Result<User, AuthError> {
        let required = [
            &input.username,
            &input.email,
            &input.password,
            &input.first_name,
            &input.last_name,
            &input.role,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::MissingFields(ALL_FIELDS_REQUIRED));
        }

        let role = input
            .role
            .parse::<UserRole>()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if !input.email.validate_email() {
            return Err(AuthError::Validation("Invalid email address".into()));
        }

        if self.repo.get_user_by_username(&input.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }
        if self.repo.get_user_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password_blocking(input.password, self.bcrypt_cost).await?;

        // A concurrent registration can still win the insert; the unique
        // index reports it as a Conflict, mapped to the same duplicate error.
        let user = self
            .repo
            .create_user(CreateUserDto {
                username: input.username,
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                role,
                department: input.department.filter(|d| !d.trim().is_empty()),
            })
            .await?;
        Ok(user)
    }

    fn issue(&self, user: User) -> Result<AuthResult, AuthError> {
        let token = create_token(&user.id, &user.username, user.role, &self.jwt_config)?;
        let expires_in = self.jwt_config.expires_in_seconds()?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in,
            user,
        })
    }
}

fn seed_name(role: UserRole) -> (&'static str, &'static str) {
    match role {
        UserRole::Admin => ("System", "Administrator"),
        UserRole::Doctor => ("Default", "Doctor"),
        UserRole::Nurse => ("Default", "Nurse"),
        UserRole::Frontdesk => ("Front", "Desk"),
        UserRole::Pharmacy => ("Default", "Pharmacist"),
        UserRole::Lab => ("Lab", "Technician"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::verify_token;
    use crate::infrastructure::InMemoryUserRepository;

    const TEST_COST: u32 = 4;

    fn service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            JwtConfig {
                secret: "test-secret".into(),
                expiration_hours: 1,
                issuer: "hmis-test".into(),
            },
            TEST_COST,
        )
    }

    fn alice() -> NewAccount {
        NewAccount {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "Secret123".into(),
            first_name: "Alice".into(),
            last_name: "A".into(),
            role: "nurse".into(),
            department: None,
        }
    }

    #[tokio::test]
    async fn registration_token_matches_the_stored_row() {
        let svc = service();
        let result = svc.register(alice()).await.unwrap();

        let claims = verify_token(&result.token, svc.jwt_config()).unwrap();
        assert_eq!(claims.sub, result.user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::Nurse);
        assert_eq!(result.token_type, "Bearer");
        assert_eq!(result.expires_in, 3600);

        assert!(result.user.is_active);
        assert_ne!(result.user.password_hash, "Secret123");
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_any_lookup() {
        let svc = service();
        let err = svc
            .register(NewAccount {
                last_name: "  ".into(),
                ..alice()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MissingFields(ALL_FIELDS_REQUIRED)));
        assert_eq!(svc.repo.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_role_and_bad_email_are_validation_errors() {
        let svc = service();

        let err = svc
            .register(NewAccount {
                role: "janitor".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = svc
            .register(NewAccount {
                email: "not-an-email".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_creates_no_row() {
        let svc = service();
        svc.register(alice()).await.unwrap();

        let err = svc
            .register(NewAccount {
                email: "bob@x.com".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let err = svc
            .register(NewAccount {
                username: "bob".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        assert_eq!(svc.repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let svc = service();
        svc.register(alice()).await.unwrap();

        let unknown = svc.login("mallory", "Secret123").await.unwrap_err();
        let wrong = svc.login("alice", "wrong").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_hash_comparison() {
        let svc = service();
        assert!(svc.dummy_hash.get().is_none());

        let err = svc.login("mallory", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let dummy = svc.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(matches!(
            svc.login("mallory", DUMMY_PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn inactive_account_is_reported_distinctly() {
        let svc = service();
        let registered = svc.register(alice()).await.unwrap();
        svc.set_active(&registered.user.id, false).await.unwrap();

        let err = svc.login("alice", "Secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));
    }

    #[tokio::test]
    async fn login_stamps_last_login_monotonically() {
        let svc = service();
        svc.register(alice()).await.unwrap();

        let first = svc.login("alice", "Secret123").await.unwrap();
        let first_at = first.user.last_login.unwrap();

        let second = svc.login("alice", "Secret123").await.unwrap();
        assert!(second.user.last_login.unwrap() >= first_at);

        let stored = svc.get_profile(&second.user.id).await.unwrap();
        assert_eq!(stored.last_login, second.user.last_login);
    }

    #[tokio::test]
    async fn failed_password_change_leaves_hash_untouched() {
        let svc = service();
        let registered = svc.register(alice()).await.unwrap();

        let err = svc
            .change_password("alice", "wrong", "NewSecret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CurrentPasswordIncorrect));

        let stored = svc.get_profile(&registered.user.id).await.unwrap();
        assert_eq!(stored.password_hash, registered.user.password_hash);
    }

    #[tokio::test]
    async fn alice_scenario() {
        let svc = service();
        svc.register(alice()).await.unwrap();

        assert!(matches!(
            svc.register(NewAccount {
                email: "bob@x.com".into(),
                ..alice()
            })
            .await,
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            svc.login("alice", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));

        let logged_in = svc.login("alice", "Secret123").await.unwrap();
        assert!(logged_in.user.last_login.is_some());

        svc.change_password("alice", "Secret123", "NewSecret1")
            .await
            .unwrap();
        assert!(matches!(
            svc.login("alice", "Secret123").await,
            Err(AuthError::InvalidCredentials)
        ));
        svc.login("alice", "NewSecret1").await.unwrap();

        // Issued before the change, still accepted.
        assert!(verify_token(&logged_in.token, svc.jwt_config()).is_ok());
    }

    #[tokio::test]
    async fn profile_of_deleted_account_is_not_found() {
        let svc = service();
        let registered = svc.register(alice()).await.unwrap();
        svc.delete_user(&registered.user.id).await.unwrap();

        assert!(matches!(
            svc.get_profile(&registered.user.id).await,
            Err(AuthError::NotFound)
        ));
    }

    #[tokio::test]
    async fn seeding_creates_one_account_per_role_once() {
        let svc = service();
        let seed = SeedConfig::default();

        assert_eq!(svc.seed_default_users(&seed).await.unwrap(), UserRole::ALL.len());
        assert_eq!(svc.seed_default_users(&seed).await.unwrap(), 0);

        let lab = svc.login("lab", &seed.default_password).await.unwrap();
        assert_eq!(lab.user.role, UserRole::Lab);
        assert_eq!(lab.user.department.as_deref(), Some("Laboratory"));
    }
}
