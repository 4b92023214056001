//! Notification queue store.
//!
//! The conditional claim is the only synchronization primitive between
//! dispatchers: it flips `pending -> processing` in one statement and
//! reports nothing when another consumer won. Every later write is guarded
//! by `status = 'processing'`, so terminal rows are never touched again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use campusbell_core::error::{AppError, ErrorKind};
use campusbell_core::result::AppResult;
use campusbell_core::types::{JobId, TenantId, UserId};
use campusbell_entity::job::{NewNotificationJob, NotificationJob, NotificationStatus};

/// Durable queue of notification jobs.
#[async_trait]
pub trait NotificationQueueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert jobs as `pending` with zero attempts. All or nothing.
    async fn insert_many(&self, jobs: Vec<NewNotificationJob>) -> AppResult<Vec<NotificationJob>>;

    /// Find a job by ID.
    async fn find_by_id(&self, id: JobId) -> AppResult<Option<NotificationJob>>;

    /// Pending jobs whose schedule has passed at `now`, oldest first.
    ///
    /// Jobs created together are ordered by id.
    async fn find_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<NotificationJob>>;

    /// Claim a pending job: `processing`, `attempts + 1`.
    ///
    /// Returns `None` when the job is no longer pending.
    async fn claim(&self, id: JobId) -> AppResult<Option<NotificationJob>>;

    /// Mark a claimed job as sent. Returns `false` if the job was not claimed.
    async fn mark_sent(&self, id: JobId, sent_at: DateTime<Utc>) -> AppResult<bool>;

    /// Return a claimed job to `pending` until `at`, leaving attempts as-is.
    async fn reschedule(&self, id: JobId, at: DateTime<Utc>, reason: &str) -> AppResult<bool>;

    /// Mark a claimed job as failed and clear its schedule.
    async fn mark_failed(&self, id: JobId, reason: &str) -> AppResult<bool>;

    /// A user's jobs, newest first.
    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        limit: u32,
    ) -> AppResult<Vec<NotificationJob>>;

    /// Job counts per status, optionally for one tenant.
    async fn stats(&self, tenant_id: Option<TenantId>) -> AppResult<QueueStats>;
}

/// Job counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Waiting to be claimed (including backed-off jobs).
    pub pending: i64,
    /// Claimed by a dispatcher.
    pub processing: i64,
    /// Delivered.
    pub sent: i64,
    /// Exhausted.
    pub failed: i64,
}

impl QueueStats {
    /// Add `count` to the bucket of `status`.
    pub fn record(&mut self, status: NotificationStatus, count: i64) {
        match status {
            NotificationStatus::Pending => self.pending += count,
            NotificationStatus::Processing => self.processing += count,
            NotificationStatus::Sent => self.sent += count,
            NotificationStatus::Failed => self.failed += count,
        }
    }

    /// Total number of jobs.
    pub fn total(&self) -> i64 {
        self.pending + self.processing + self.sent + self.failed
    }
}

/// PostgreSQL-backed notification queue.
#[derive(Debug, Clone)]
pub struct NotificationQueueRepository {
    pool: PgPool,
}

impl NotificationQueueRepository {
    /// Create a new queue repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationQueueStore for NotificationQueueRepository {
    async fn insert_many(&self, jobs: Vec<NewNotificationJob>) -> AppResult<Vec<NotificationJob>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO notification_queue \
             (id, tenant_id, user_id, title, body, data, image_url, priority, max_attempts, scheduled_for, batch_id) ",
        );
        builder.push_values(jobs.iter(), |mut row, job| {
            row.push_bind(JobId::new())
                .push_bind(job.tenant_id)
                .push_bind(job.user_id)
                .push_bind(&job.title)
                .push_bind(&job.body)
                .push_bind(sqlx::types::Json(&job.data))
                .push_bind(&job.image_url)
                .push_bind(job.priority)
                .push_bind(job.max_attempts)
                .push_bind(job.scheduled_for)
                .push_bind(job.batch_id);
        });
        builder.push(" RETURNING *");

        builder
            .build_query_as::<NotificationJob>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue jobs", e))
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        sqlx::query_as::<_, NotificationJob>("SELECT * FROM notification_queue WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<NotificationJob>> {
        sqlx::query_as::<_, NotificationJob>(
            "SELECT * FROM notification_queue \
             WHERE status = 'pending' AND (scheduled_for IS NULL OR scheduled_for <= $1) \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2",
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to scan due jobs", e))
    }

    async fn claim(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        sqlx::query_as::<_, NotificationJob>(
            "UPDATE notification_queue SET status = 'processing', attempts = attempts + 1, \
             updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    async fn mark_sent(&self, id: JobId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_queue SET status = 'sent', sent_at = $2, scheduled_for = NULL, \
             last_error = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job sent", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reschedule(&self, id: JobId, at: DateTime<Utc>, reason: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_queue SET status = 'pending', scheduled_for = $2, \
             last_error = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(at)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule job", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, id: JobId, reason: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_queue SET status = 'failed', scheduled_for = NULL, \
             last_error = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job failed", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        limit: u32,
    ) -> AppResult<Vec<NotificationJob>> {
        sqlx::query_as::<_, NotificationJob>(
            "SELECT * FROM notification_queue WHERE tenant_id = $1 AND user_id = $2 \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list user jobs", e))
    }

    async fn stats(&self, tenant_id: Option<TenantId>) -> AppResult<QueueStats> {
        let rows: Vec<(NotificationStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM notification_queue \
             WHERE ($1::uuid IS NULL OR tenant_id = $1) \
             GROUP BY status",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count jobs", e))?;

        let mut stats = QueueStats::default();
        for (status, count) in rows {
            stats.record(status, count);
        }
        Ok(stats)
    }
}
