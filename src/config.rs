//! Application configuration
//!
//! Loaded from a TOML file (default: `~/.config/hmis-service/config.toml`).
//! Every section has defaults, so a partial file or no file at all still
//! produces a runnable configuration. A handful of environment variables
//! override file values after loading:
//!
//! | Variable               | Field                           |
//! |------------------------|---------------------------------|
//! | `DATABASE_URL`         | `database.url`                  |
//! | `JWT_SECRET`           | `security.jwt_secret`           |
//! | `JWT_EXPIRATION_HOURS` | `security.jwt_expiration_hours` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "hmis-service";
const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
const DEFAULT_SEED_PASSWORD: &str = "password";
/// One year.
const MAX_JWT_EXPIRATION_HOURS: i64 = 8760;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL. SQLite and PostgreSQL URLs are both accepted.
    pub url: String,
    pub pool: PoolConfig,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./hmis.db?mode=rwc".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            idle_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            jwt_issuer: "hmis-service".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Initial accounts created when the users table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub create_default_users: bool,
    pub default_password: String,
    /// Email domain for seeded accounts (`admin@<domain>` and so on).
    pub email_domain: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            create_default_users: true,
            default_password: DEFAULT_SEED_PASSWORD.to_string(),
            email_domain: "hospital.local".to_string(),
        }
    }
}

impl SecurityConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl SeedConfig {
    pub fn uses_default_password(&self) -> bool {
        self.default_password == DEFAULT_SEED_PASSWORD
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `plain` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(hours) = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.security.jwt_expiration_hours = hours;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret must not be empty".into()));
        }
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&self.security.jwt_expiration_hours) {
            return Err(ConfigError::Invalid(format!(
                "security.jwt_expiration_hours must be between 1 and {}",
                MAX_JWT_EXPIRATION_HOURS
            )));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [server]
            api_port = 8081

            [security]
            jwt_secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.api_port, 8081);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.security.jwt_secret, "s3cret");
        assert_eq!(cfg.security.jwt_expiration_hours, 24);
        assert!(cfg.seed.create_default_users);
    }

    #[test]
    fn rejects_zero_expiry() {
        let mut cfg = AppConfig::default();
        cfg.security.jwt_expiration_hours = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_expiry_beyond_a_year() {
        let mut cfg = AppConfig::default();
        cfg.security.jwt_expiration_hours = 10_000_000_000_000_000;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        cfg.security.jwt_expiration_hours = 8761;
        assert!(cfg.validate().is_err());

        cfg.security.jwt_expiration_hours = 8760;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn default_credentials_are_detected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.security.uses_default_secret());
        assert!(cfg.seed.uses_default_password());

        cfg.security.jwt_secret = "rotated".into();
        cfg.seed.default_password = "Str0ng!pass".into();
        assert!(!cfg.security.uses_default_secret());
        assert!(!cfg.seed.uses_default_password());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(cfg.logging.level, "info");
    }
}
