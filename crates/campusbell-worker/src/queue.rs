//! Dispatcher view of the notification queue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing;

use campusbell_core::result::AppResult;
use campusbell_core::types::TenantId;
use campusbell_database::{NotificationQueueStore, QueueStats};
use campusbell_entity::job::NotificationJob;

/// Claim and settle operations used by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    store: Arc<dyn NotificationQueueStore>,
}

impl DispatchQueue {
    /// Create a new dispatch queue
    pub fn new(store: Arc<dyn NotificationQueueStore>) -> Self {
        Self { store }
    }

    /// Due pending jobs, oldest first
    pub async fn due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<NotificationJob>> {
        self.store.find_due(now, limit).await
    }

    /// Claim a job; `None` if another dispatcher got it first
    pub async fn claim(&self, job: &NotificationJob) -> AppResult<Option<NotificationJob>> {
        let claimed = self.store.claim(job.id).await?;
        if claimed.is_none() {
            tracing::debug!(job_id = %job.id, "Job already claimed elsewhere, skipping");
        }
        Ok(claimed)
    }

    /// Mark a claimed job as sent
    pub async fn complete(&self, job: &NotificationJob, sent_at: DateTime<Utc>) -> AppResult<()> {
        if !self.store.mark_sent(job.id, sent_at).await? {
            tracing::warn!(job_id = %job.id, "Job was not in processing when marking sent");
        }
        Ok(())
    }

    /// Put a claimed job back to pending until `at`
    pub async fn retry(&self, job: &NotificationJob, at: DateTime<Utc>, reason: &str) -> AppResult<()> {
        if !self.store.reschedule(job.id, at, reason).await? {
            tracing::warn!(job_id = %job.id, "Job was not in processing when rescheduling");
        }
        Ok(())
    }

    /// Mark a claimed job as failed
    pub async fn fail(&self, job: &NotificationJob, reason: &str) -> AppResult<()> {
        if !self.store.mark_failed(job.id, reason).await? {
            tracing::warn!(job_id = %job.id, "Job was not in processing when marking failed");
        }
        Ok(())
    }

    /// Job counts per status
    pub async fn stats(&self, tenant_id: Option<TenantId>) -> AppResult<QueueStats> {
        self.store.stats(tenant_id).await
    }
}
