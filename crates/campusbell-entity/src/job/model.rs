//! Notification job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campusbell_core::types::{BatchId, JobId, TenantId, UserId};

use super::payload::NotificationData;
use super::status::{NotificationPriority, NotificationStatus};

/// Default attempts allowed per job.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// One notification for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationJob {
    /// Unique job identifier.
    pub id: JobId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Recipient user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Event-specific payload.
    #[sqlx(json)]
    pub data: NotificationData,
    /// Optional image shown with the notification.
    pub image_url: Option<String>,
    /// Current status.
    pub status: NotificationStatus,
    /// Provider priority hint.
    pub priority: NotificationPriority,
    /// Number of claims so far.
    pub attempts: i32,
    /// Claims allowed before the job fails.
    pub max_attempts: i32,
    /// Earliest time the job may be claimed (None = immediately).
    pub scheduled_for: Option<DateTime<Utc>>,
    /// When the provider accepted the job.
    pub sent_at: Option<DateTime<Utc>>,
    /// Fan-out call that produced the job.
    pub batch_id: Option<BatchId>,
    /// Reason of the last retry or failure.
    pub last_error: Option<String>,
    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the job was last written.
    pub updated_at: DateTime<Utc>,
}

impl NotificationJob {
    /// Whether another failure would exhaust the job.
    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Whether the job may be claimed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotificationStatus::Pending
            && self.scheduled_for.map(|at| at <= now).unwrap_or(true)
    }
}

/// Data required to enqueue a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotificationJob {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Recipient user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Event-specific payload.
    pub data: NotificationData,
    /// Optional image.
    pub image_url: Option<String>,
    /// Provider priority hint.
    pub priority: NotificationPriority,
    /// Claims allowed before the job fails.
    pub max_attempts: i32,
    /// Earliest claim time.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Shared fan-out identifier.
    pub batch_id: Option<BatchId>,
}

impl NewNotificationJob {
    /// Materialize the pending row as it will be stored.
    pub fn into_job(self, id: JobId, now: DateTime<Utc>) -> NotificationJob {
        NotificationJob {
            id,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            title: self.title,
            body: self.body,
            data: self.data,
            image_url: self.image_url,
            status: NotificationStatus::Pending,
            priority: self.priority,
            attempts: 0,
            max_attempts: self.max_attempts,
            scheduled_for: self.scheduled_for,
            sent_at: None,
            batch_id: self.batch_id,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusbell_core::types::AnnouncementId;
    use chrono::Duration;

    fn new_job() -> NewNotificationJob {
        NewNotificationJob {
            tenant_id: TenantId::new(),
            user_id: UserId::new(),
            title: "School closed".into(),
            body: "Snow day".into(),
            data: NotificationData::Announcement {
                announcement_id: AnnouncementId::new(),
            },
            image_url: None,
            priority: NotificationPriority::High,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            scheduled_for: None,
            batch_id: Some(BatchId::new()),
        }
    }

    #[test]
    fn test_into_job_starts_pending() {
        let now = Utc::now();
        let job = new_job().into_job(JobId::new(), now);
        assert_eq!(job.status, NotificationStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.sent_at.is_none());
        assert!(job.is_due(now));
    }

    #[test]
    fn test_future_schedule_is_not_due() {
        let now = Utc::now();
        let mut job = new_job().into_job(JobId::new(), now);
        job.scheduled_for = Some(now + Duration::seconds(15));
        assert!(!job.is_due(now));
        assert!(job.is_due(now + Duration::seconds(15)));
    }

    #[test]
    fn test_attempts_exhausted() {
        let mut job = new_job().into_job(JobId::new(), Utc::now());
        job.attempts = 2;
        assert!(!job.attempts_exhausted());
        job.attempts = 3;
        assert!(job.attempts_exhausted());
    }
}
