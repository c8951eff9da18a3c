//! HMIS service CLI server
//!
//! Headless hospital management API suitable for deployment as a systemd
//! service, Docker container or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/hmis-service/config.toml)
//! hmis-service
//!
//! # Custom config path
//! hmis-service --config /etc/hmis-service/config.toml
//!
//! # Override the port
//! hmis-service --api-port 8080
//!
//! # Validate config without starting
//! hmis-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use hmis::config::AppConfig;
use hmis::server::{init_tracing, ServerHandle, ServerOptions};

/// Hospital management REST API server.
#[derive(Parser, Debug)]
#[command(
    name = "hmis-service",
    version,
    about = "Hospital management REST API",
    long_about = "HMIS service: REST API for patients, appointments, admissions, \
                  prescriptions, medications, billing and staff accounts.\n\n\
                  Default config: ~/.config/hmis-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "HMIS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default staff accounts.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(hmis::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("{}", e);
            return Err(e.into());
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.connection_url());
        println!("   Log level   : {}", config.logging.level);
        println!("   Log format  : {}", config.logging.format);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed_default_users: !cli.no_seed,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
