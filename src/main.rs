//! CampusBell Server: notification dispatcher process.
//!
//! Loads configuration, prepares the database and runs the dispatcher
//! worker until Ctrl+C or SIGTERM.

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use campusbell::{Pipeline, Stores};
use campusbell_core::config::AppConfig;
use campusbell_core::error::AppError;
use campusbell_database::DatabasePool;
use campusbell_push::PushAdapter;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("CAMPUSBELL_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("CAMPUSBELL_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CampusBell v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    campusbell_database::migration::run_migrations(db.pool()).await?;

    if !config.worker.enabled {
        tracing::info!("Notification worker disabled by configuration, exiting");
        db.close().await;
        return Ok(());
    }

    let adapter = PushAdapter::from_config(&config.push)?;
    tracing::info!(
        provider = adapter.provider().name(),
        endpoint = %config.push.endpoint,
        max_batch_size = config.push.max_batch_size,
        "Push adapter ready"
    );

    let pipeline = Pipeline::new(Stores::postgres(&db), adapter, &config.worker);
    let runner = pipeline.runner();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(async move { runner.run(shutdown_rx).await });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Worker task ended abnormally");
    }

    db.close().await;
    tracing::info!("CampusBell stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
