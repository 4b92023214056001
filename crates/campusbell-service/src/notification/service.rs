//! Inbox read path.

use std::sync::Arc;

use campusbell_core::result::AppResult;
use campusbell_core::types::{TenantId, UserId};
use campusbell_database::NotificationQueueStore;
use campusbell_entity::job::NotificationJob;

/// Page size used when the caller does not pass one.
pub const DEFAULT_INBOX_LIMIT: u32 = 50;

/// Largest page a caller may request.
pub const MAX_INBOX_LIMIT: u32 = 100;

/// Read access to a user's own notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    queue: Arc<dyn NotificationQueueStore>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(queue: Arc<dyn NotificationQueueStore>) -> Self {
        Self { queue }
    }

    /// A user's queued and historical notifications, newest first.
    pub async fn inbox(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        limit: Option<u32>,
    ) -> AppResult<Vec<NotificationJob>> {
        let limit = limit
            .unwrap_or(DEFAULT_INBOX_LIMIT)
            .clamp(1, MAX_INBOX_LIMIT);
        self.queue.list_for_user(tenant_id, user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusbell_core::types::AnnouncementId;
    use campusbell_database::memory::InMemoryQueueStore;
    use campusbell_entity::job::{NewNotificationJob, NotificationData, NotificationPriority};

    fn job(tenant_id: TenantId, user_id: UserId) -> NewNotificationJob {
        NewNotificationJob {
            tenant_id,
            user_id,
            title: "Parent evening".into(),
            body: "Thursday 18:00".into(),
            data: NotificationData::Announcement {
                announcement_id: AnnouncementId::new(),
            },
            image_url: None,
            priority: NotificationPriority::High,
            max_attempts: 3,
            scheduled_for: None,
            batch_id: None,
        }
    }

    #[tokio::test]
    async fn test_inbox_limit_is_clamped() {
        let queue = Arc::new(InMemoryQueueStore::new());
        let (tenant, user) = (TenantId::new(), UserId::new());
        queue
            .insert_many((0..120).map(|_| job(tenant, user)).collect())
            .await
            .unwrap();
        let service = NotificationService::new(queue);

        assert_eq!(service.inbox(tenant, user, None).await.unwrap().len(), 50);
        assert_eq!(service.inbox(tenant, user, Some(500)).await.unwrap().len(), 100);
        assert_eq!(service.inbox(tenant, user, Some(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inbox_is_tenant_scoped() {
        let queue = Arc::new(InMemoryQueueStore::new());
        let user = UserId::new();
        queue
            .insert_many(vec![job(TenantId::new(), user)])
            .await
            .unwrap();
        let service = NotificationService::new(queue);

        assert!(service.inbox(TenantId::new(), user, None).await.unwrap().is_empty());
    }
}
