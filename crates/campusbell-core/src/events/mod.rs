//! Domain events that fan out into push notifications.
//!
//! Business code emits these right after committing the triggering
//! write. The notification trigger service consumes them.

pub mod announcement;
pub mod diary;
pub mod gallery;
pub mod message;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use announcement::{AnnouncementCreated, AudienceTag};
pub use diary::DiaryUpdated;
pub use gallery::GalleryPostCreated;
pub use message::NewMessage;

use crate::types::TenantId;

/// Wrapper for a notification-triggering event with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of the four notification-triggering events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// A direct message was sent.
    NewMessage(NewMessage),
    /// A student's diary entry changed.
    DiaryUpdated(DiaryUpdated),
    /// An announcement was published.
    AnnouncementCreated(AnnouncementCreated),
    /// A gallery post was published to a class.
    GalleryPostCreated(GalleryPostCreated),
}

impl EventPayload {
    /// Tenant the event belongs to.
    pub fn tenant_id(&self) -> TenantId {
        match self {
            Self::NewMessage(e) => e.tenant_id,
            Self::DiaryUpdated(e) => e.tenant_id,
            Self::AnnouncementCreated(e) => e.tenant_id,
            Self::GalleryPostCreated(e) => e.tenant_id,
        }
    }

    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::DiaryUpdated(_) => "diary_updated",
            Self::AnnouncementCreated(_) => "announcement_created",
            Self::GalleryPostCreated(_) => "gallery_post_created",
        }
    }
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}
