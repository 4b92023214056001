//! Event triggers: turn domain events into queued notification jobs.
//!
//! Triggers run right after the business write commits and must never fail
//! it. Every public entry point logs and swallows its errors, returning
//! the number of jobs written (zero on any failure).

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, error, info};

use campusbell_core::events::{
    AnnouncementCreated, DiaryUpdated, DomainEvent, EventPayload, GalleryPostCreated, NewMessage,
};
use campusbell_core::result::AppResult;
use campusbell_core::types::{BatchId, TenantId, UserId, truncate_chars};
use campusbell_database::NotificationQueueStore;
use campusbell_entity::job::model::DEFAULT_MAX_ATTEMPTS;
use campusbell_entity::job::{
    NewNotificationJob, NotificationData, NotificationKind, NotificationPriority,
};

use super::rules::RecipientResolver;
use crate::settings::SettingsService;

/// Longest body derived from free text.
pub const BODY_PREVIEW_CHARS: usize = 100;

/// What every job of one fan-out call shares.
#[derive(Debug, Clone)]
struct JobTemplate {
    title: String,
    body: String,
    data: NotificationData,
    image_url: Option<String>,
    priority: NotificationPriority,
}

/// Fans domain events out into one queued job per recipient.
#[derive(Debug, Clone)]
pub struct NotificationTriggers {
    queue: Arc<dyn NotificationQueueStore>,
    resolver: RecipientResolver,
    settings: SettingsService,
    max_attempts: i32,
    wake: Option<Arc<Notify>>,
}

impl NotificationTriggers {
    /// Creates the trigger service.
    pub fn new(
        queue: Arc<dyn NotificationQueueStore>,
        resolver: RecipientResolver,
        settings: SettingsService,
    ) -> Self {
        Self {
            queue,
            resolver,
            settings,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            wake: None,
        }
    }

    /// Attempts allowed for every job this service writes.
    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Signal `wake` whenever jobs are written.
    pub fn with_wake(mut self, wake: Arc<Notify>) -> Self {
        self.wake = Some(wake);
        self
    }

    /// Dispatch any domain event to its trigger.
    pub async fn handle(&self, event: &DomainEvent) -> usize {
        match &event.payload {
            EventPayload::NewMessage(e) => self.on_new_message(e).await,
            EventPayload::DiaryUpdated(e) => self.on_diary_updated(e).await,
            EventPayload::AnnouncementCreated(e) => self.on_announcement_created(e).await,
            EventPayload::GalleryPostCreated(e) => self.on_gallery_post_created(e).await,
        }
    }

    /// One job for the message recipient.
    pub async fn on_new_message(&self, event: &NewMessage) -> usize {
        let result = self.try_new_message(event).await;
        self.settle("new_message", event.tenant_id, result)
    }

    /// One job per guardian of the student.
    pub async fn on_diary_updated(&self, event: &DiaryUpdated) -> usize {
        let result = self.try_diary_updated(event).await;
        self.settle("diary_updated", event.tenant_id, result)
    }

    /// One high-priority job per member of the audience.
    pub async fn on_announcement_created(&self, event: &AnnouncementCreated) -> usize {
        let result = self.try_announcement_created(event).await;
        self.settle("announcement_created", event.tenant_id, result)
    }

    /// One job per guardian of the class's students.
    pub async fn on_gallery_post_created(&self, event: &GalleryPostCreated) -> usize {
        let result = self.try_gallery_post_created(event).await;
        self.settle("gallery_post_created", event.tenant_id, result)
    }

    async fn try_new_message(&self, event: &NewMessage) -> AppResult<usize> {
        if !self.enabled(event.tenant_id, NotificationKind::Message).await? {
            return Ok(0);
        }
        let mut recipients = BTreeSet::from([event.recipient_id]);
        recipients.remove(&event.sender_id);

        let template = JobTemplate {
            title: format!("New message from {}", event.sender_name),
            body: truncate_chars(&event.content, BODY_PREVIEW_CHARS),
            data: NotificationData::NewMessage {
                sender_id: event.sender_id,
                message_id: event.message_id,
            },
            image_url: None,
            priority: NotificationPriority::Normal,
        };
        self.enqueue(event.tenant_id, recipients, template).await
    }

    async fn try_diary_updated(&self, event: &DiaryUpdated) -> AppResult<usize> {
        if !self.enabled(event.tenant_id, NotificationKind::Diary).await? {
            return Ok(0);
        }
        let recipients = self
            .resolver
            .guardians_of_student(event.tenant_id, event.student_id)
            .await?;

        let template = JobTemplate {
            title: "Diary updated".to_string(),
            body: format!(
                "{}'s diary for {} has been updated",
                event.student_name,
                event.date.format("%Y-%m-%d")
            ),
            data: NotificationData::DiaryUpdate {
                student_id: event.student_id,
                date: event.date,
            },
            image_url: None,
            priority: NotificationPriority::Normal,
        };
        self.enqueue(event.tenant_id, recipients, template).await
    }

    async fn try_announcement_created(&self, event: &AnnouncementCreated) -> AppResult<usize> {
        if !self.enabled(event.tenant_id, NotificationKind::Announcement).await? {
            return Ok(0);
        }
        let recipients = self
            .resolver
            .announcement_audience(
                event.tenant_id,
                &event.target_audience,
                event.class_ids.as_deref(),
            )
            .await?;

        let template = JobTemplate {
            title: event.title.clone(),
            body: truncate_chars(&event.content, BODY_PREVIEW_CHARS),
            data: NotificationData::Announcement {
                announcement_id: event.announcement_id,
            },
            image_url: event.image_url.clone(),
            priority: NotificationPriority::High,
        };
        self.enqueue(event.tenant_id, recipients, template).await
    }

    async fn try_gallery_post_created(&self, event: &GalleryPostCreated) -> AppResult<usize> {
        if !self.enabled(event.tenant_id, NotificationKind::Gallery).await? {
            return Ok(0);
        }
        let recipients = self
            .resolver
            .guardians_of_classes(event.tenant_id, Some(&[event.class_id][..]))
            .await?;

        let body = match event.caption.as_deref().map(str::trim) {
            Some(caption) if !caption.is_empty() => truncate_chars(caption, BODY_PREVIEW_CHARS),
            _ => format!("A new post was shared in {}", event.class_name),
        };
        let template = JobTemplate {
            title: format!("New photos in {}", event.class_name),
            body,
            data: NotificationData::GalleryPost {
                post_id: event.post_id,
                class_id: event.class_id,
            },
            image_url: event.image_url.clone(),
            priority: NotificationPriority::Normal,
        };
        self.enqueue(event.tenant_id, recipients, template).await
    }

    async fn enabled(&self, tenant_id: TenantId, kind: NotificationKind) -> AppResult<bool> {
        let enabled = self.settings.is_enabled(tenant_id, kind).await?;
        if !enabled {
            debug!(tenant_id = %tenant_id, kind = %kind, "Notifications disabled for tenant");
        }
        Ok(enabled)
    }

    /// Write one job per recipient, all sharing a fresh batch id.
    async fn enqueue(
        &self,
        tenant_id: TenantId,
        recipients: BTreeSet<UserId>,
        template: JobTemplate,
    ) -> AppResult<usize> {
        if recipients.is_empty() {
            debug!(tenant_id = %tenant_id, kind = %template.data.kind(), "No recipients");
            return Ok(0);
        }

        let batch_id = BatchId::new();
        let jobs: Vec<NewNotificationJob> = recipients
            .into_iter()
            .map(|user_id| NewNotificationJob {
                tenant_id,
                user_id,
                title: template.title.clone(),
                body: template.body.clone(),
                data: template.data.clone(),
                image_url: template.image_url.clone(),
                priority: template.priority,
                max_attempts: self.max_attempts,
                scheduled_for: None,
                batch_id: Some(batch_id),
            })
            .collect();

        let written = self.queue.insert_many(jobs).await?.len();
        info!(
            tenant_id = %tenant_id,
            batch_id = %batch_id,
            kind = %template.data.kind(),
            jobs = written,
            "Notification jobs enqueued"
        );

        if let Some(wake) = &self.wake {
            wake.notify_one();
        }
        Ok(written)
    }

    fn settle(&self, event: &'static str, tenant_id: TenantId, result: AppResult<usize>) -> usize {
        match result {
            Ok(count) => count,
            Err(e) => {
                error!(event, tenant_id = %tenant_id, error = %e, "Notification fan-out failed");
                0
            }
        }
    }
}
