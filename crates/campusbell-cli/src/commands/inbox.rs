//! Inbox listing.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use campusbell_core::error::AppError;
use campusbell_core::types::{TenantId, UserId};
use campusbell_database::DatabasePool;
use campusbell_database::repositories::NotificationQueueRepository;
use campusbell_entity::job::NotificationJob;
use campusbell_service::NotificationService;

use crate::output::{self, OutputFormat};

/// Arguments for the inbox command
#[derive(Debug, Args)]
pub struct InboxArgs {
    /// Tenant ID
    pub tenant: TenantId,
    /// User ID
    pub user: UserId,
    /// Maximum rows (1-100, default 50)
    #[arg(short, long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Tabled)]
struct InboxRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Attempts")]
    attempts: String,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Sent")]
    sent_at: String,
    #[tabled(rename = "Last Error")]
    last_error: String,
}

impl From<&NotificationJob> for InboxRow {
    fn from(job: &NotificationJob) -> Self {
        Self {
            id: job.id.to_string(),
            status: job.status.to_string(),
            priority: job.priority.to_string(),
            title: job.title.clone(),
            attempts: format!("{}/{}", job.attempts, job.max_attempts),
            created_at: job.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            sent_at: output::or_dash(job.sent_at.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
            last_error: output::or_dash(job.last_error.as_deref()),
        }
    }
}

/// Execute the inbox command
pub async fn execute(args: &InboxArgs, pool: &DatabasePool, format: OutputFormat) -> Result<(), AppError> {
    let service = NotificationService::new(Arc::new(NotificationQueueRepository::new(
        pool.pool().clone(),
    )));
    let jobs = service.inbox(args.tenant, args.user, args.limit).await?;

    match format {
        OutputFormat::Json => output::print_json(&jobs),
        OutputFormat::Table => {
            let rows: Vec<InboxRow> = jobs.iter().map(InboxRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
