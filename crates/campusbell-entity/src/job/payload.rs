//! Typed notification payloads.
//!
//! Serialized into the job's `data` column and forwarded to the device,
//! where clients switch on the `type` field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use campusbell_core::types::{AnnouncementId, ClassId, MessageId, PostId, StudentId, UserId};

/// Event-specific data attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NotificationData {
    /// A direct message arrived.
    NewMessage {
        /// Author of the message.
        sender_id: UserId,
        /// The message.
        message_id: MessageId,
    },
    /// A student's diary changed.
    DiaryUpdate {
        /// The student.
        student_id: StudentId,
        /// Day of the diary entry.
        date: NaiveDate,
    },
    /// An announcement was published.
    Announcement {
        /// The announcement.
        announcement_id: AnnouncementId,
    },
    /// A gallery post was published.
    GalleryPost {
        /// The post.
        post_id: PostId,
        /// Class the post belongs to.
        class_id: ClassId,
    },
}

impl NotificationData {
    /// Which trigger produced this payload.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::NewMessage { .. } => NotificationKind::Message,
            Self::DiaryUpdate { .. } => NotificationKind::Diary,
            Self::Announcement { .. } => NotificationKind::Announcement,
            Self::GalleryPost { .. } => NotificationKind::Gallery,
        }
    }

    /// Payload as a JSON value for the provider.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// The four notification triggers, each gated by a tenant setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Direct messages.
    Message,
    /// Diary updates.
    Diary,
    /// Announcements.
    Announcement,
    /// Gallery posts.
    Gallery,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Diary => "diary",
            Self::Announcement => "announcement",
            Self::Gallery => "gallery",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
