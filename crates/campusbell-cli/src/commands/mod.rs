//! CLI command definitions and dispatch.

pub mod device;
pub mod inbox;
pub mod migrate;
pub mod settings;
pub mod worker;

use clap::{Parser, Subcommand};

use campusbell_core::config::AppConfig;
use campusbell_core::error::AppError;
use campusbell_database::DatabasePool;

use crate::output::OutputFormat;

/// CampusBell notification pipeline operator tool
#[derive(Debug, Parser)]
#[command(name = "campusbell", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Dispatcher status and manual ticks
    Worker(worker::WorkerArgs),
    /// Show a user's notifications
    Inbox(inbox::InboxArgs),
    /// Device token registry
    Device(device::DeviceArgs),
    /// Tenant notification settings
    Settings(settings::SettingsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;
        let pool = DatabasePool::connect(&config.database).await?;

        let result = match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &pool).await,
            Commands::Worker(args) => worker::execute(args, &config, &pool, self.format).await,
            Commands::Inbox(args) => inbox::execute(args, &pool, self.format).await,
            Commands::Device(args) => device::execute(args, &pool, self.format).await,
            Commands::Settings(args) => settings::execute(args, &pool, self.format).await,
        };

        pool.close().await;
        result
    }
}
