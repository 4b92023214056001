//! Dispatcher status and manual ticks.

use std::sync::Arc;

use clap::{Args, Subcommand};

use campusbell_core::config::AppConfig;
use campusbell_core::error::AppError;
use campusbell_core::types::TenantId;
use campusbell_database::DatabasePool;
use campusbell_database::repositories::{DeviceTokenRepository, NotificationQueueRepository};
use campusbell_push::PushAdapter;
use campusbell_worker::{DispatchQueue, Dispatcher};

use crate::output::{self, OutputFormat};

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Show queue counts per status
    Status {
        /// Only count jobs of this tenant
        #[arg(short, long)]
        tenant: Option<TenantId>,
    },
    /// Run one dispatcher tick against the configured provider
    Tick,
}

/// Execute worker commands
pub async fn execute(
    args: &WorkerArgs,
    config: &AppConfig,
    pool: &DatabasePool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let queue = DispatchQueue::new(Arc::new(NotificationQueueRepository::new(
        pool.pool().clone(),
    )));

    match &args.command {
        WorkerCommand::Status { tenant } => {
            let stats = queue.stats(*tenant).await?;
            output::print_record(
                "Notification Queue Status",
                &stats,
                &[
                    ("Pending", stats.pending.to_string()),
                    ("Processing", stats.processing.to_string()),
                    ("Sent", stats.sent.to_string()),
                    ("Failed", stats.failed.to_string()),
                    ("Total", stats.total().to_string()),
                    ("Worker Enabled", config.worker.enabled.to_string()),
                    ("Batch Size", config.worker.batch_size.to_string()),
                    ("Max Attempts", config.worker.max_attempts.to_string()),
                ],
                format,
            );
            if format == OutputFormat::Table && !config.worker.enabled {
                output::print_warning("The worker is disabled in this configuration.");
            }
        }
        WorkerCommand::Tick => {
            let dispatcher = Dispatcher::new(
                queue,
                Arc::new(DeviceTokenRepository::new(pool.pool().clone())),
                PushAdapter::from_config(&config.push)?,
                &config.worker,
            );
            let summary = dispatcher.tick().await;
            output::print_record(
                "Tick Summary",
                &summary,
                &[
                    ("Scanned", summary.scanned.to_string()),
                    ("Claimed", summary.claimed.to_string()),
                    ("Sent", summary.sent.to_string()),
                    ("Retried", summary.retried.to_string()),
                    ("Failed", summary.failed.to_string()),
                    ("Errors", summary.errors.to_string()),
                ],
                format,
            );
        }
    }

    Ok(())
}
