//! Server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database, migrations, seed
//! accounts, the REST API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::AuthService;
use crate::config::AppConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::{init_database, DatabaseConfig};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the default staff accounts when no user exists (default: true).
    pub seed_default_users: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed_default_users: true,
        }
    }
}

/// The global recorder can only be installed once per process, so a
/// restart within the same process reuses the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Metrics recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

/// Handle to a running service.
///
/// ```rust,no_run
/// use hmis::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub auth_service: Arc<AuthService>,
    pub config: AppConfig,
    /// Address the API is actually bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!(version = env!("CARGO_PKG_VERSION"), "Starting HMIS service");

        let metrics = prometheus_handle();

        let db_config = DatabaseConfig::from(&app_cfg.database);
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        if app_cfg.security.uses_default_secret() {
            warn!("security.jwt_secret is the built-in default; set JWT_SECRET before exposing this service");
        }

        let jwt_config = JwtConfig::from(&app_cfg.security);
        info!(
            expiration_hours = jwt_config.expiration_hours,
            "JWT configured"
        );

        let state = ApiState::new(db.clone(), jwt_config, app_cfg.security.bcrypt_cost);

        if opts.seed_default_users && app_cfg.seed.create_default_users {
            match state.auth_service.seed_default_users(&app_cfg.seed).await {
                Ok(0) => {}
                Ok(created) => {
                    info!(created, "Default accounts created");
                    if app_cfg.seed.uses_default_password() {
                        warn!("Seeded accounts use the built-in default password; change it after first login");
                    }
                }
                Err(e) => error!(error = %e, "Failed to seed default accounts"),
            }
        }

        let auth_service = state.auth_service.clone();
        let router = create_api_router(state, metrics);

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let signal = shutdown.signal();

        let addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            signal.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            auth_service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGINT/SIGTERM listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests to drain, then close the database.
    pub async fn wait(self) {
        info!("Waiting for in-flight requests to finish");

        let api_task = self.api_task;
        let drained = self
            .shutdown
            .drain(async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "REST API task panicked");
                }
            })
            .await;
        if !drained {
            warn!("Shutdown timeout elapsed before all requests finished");
        }

        match self.db.close().await {
            Ok(()) => info!("Database connection closed"),
            Err(e) => warn!(error = %e, "Error closing database connection"),
        }

        info!("HMIS service stopped");
    }

    pub async fn shutdown(self) {
        info!("Shutting down HMIS service");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Install the tracing subscriber. Call once, before [`ServerHandle::start`].
///
/// `RUST_LOG` wins over `logging.level` when set.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> ServerOptions {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 2;
        config.database.url = "sqlite::memory:".into();
        config.database.pool.max_connections = 1;
        config.database.pool.min_connections = 1;
        config.security.bcrypt_cost = 4;
        ServerOptions {
            config,
            ..ServerOptions::default()
        }
    }

    #[tokio::test]
    async fn starts_seeds_and_shuts_down() {
        let handle = ServerHandle::start(test_options()).await.unwrap();
        assert!(handle.is_running());
        assert_ne!(handle.local_addr.port(), 0);

        let admin = handle.auth_service.login("admin", "password").await;
        assert!(admin.is_ok());

        handle.shutdown().await;
    }
}
