//! Tenant notification settings commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use campusbell_core::error::AppError;
use campusbell_core::types::TenantId;
use campusbell_database::DatabasePool;
use campusbell_database::repositories::NotificationSettingsRepository;
use campusbell_service::SettingsService;

use crate::output::{self, OutputFormat};

/// Arguments for settings commands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the effective settings of a tenant
    Show {
        /// Tenant ID
        tenant: TenantId,
    },
}

/// Execute settings commands
pub async fn execute(args: &SettingsArgs, pool: &DatabasePool, format: OutputFormat) -> Result<(), AppError> {
    let service = SettingsService::new(Arc::new(NotificationSettingsRepository::new(
        pool.pool().clone(),
    )));

    match &args.command {
        SettingsCommand::Show { tenant } => {
            let settings = service.effective(*tenant).await?;
            output::print_record(
                "Notification Settings",
                &settings,
                &[
                    ("Messages", settings.message_enabled.to_string()),
                    ("Diary", settings.diary_enabled.to_string()),
                    ("Announcements", settings.announcement_enabled.to_string()),
                    ("Gallery", settings.gallery_enabled.to_string()),
                    ("Quiet Hours Start", output::or_dash(settings.quiet_hours_start)),
                    ("Quiet Hours End", output::or_dash(settings.quiet_hours_end)),
                    ("Max Per User Hourly", output::or_dash(settings.max_per_user_hourly)),
                    ("Max Per User Daily", output::or_dash(settings.max_per_user_daily)),
                    ("Batch Window (s)", output::or_dash(settings.batch_window_seconds)),
                    ("Updated", output::or_dash(settings.updated_at)),
                ],
                format,
            );
            if format == OutputFormat::Table && settings.updated_at.is_none() {
                output::print_warning("No stored settings; showing defaults.");
            }
        }
    }
    Ok(())
}
