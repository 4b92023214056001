//! Announcement events and audience targeting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AnnouncementId, ClassId, TenantId};

/// An announcement was published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementCreated {
    /// Tenant of the announcement.
    pub tenant_id: TenantId,
    /// The announcement.
    pub announcement_id: AnnouncementId,
    /// Announcement headline, used as notification title.
    pub title: String,
    /// Announcement text.
    pub content: String,
    /// Audience tags, e.g. `["guardians", "teacher"]`.
    pub target_audience: Vec<AudienceTag>,
    /// Restricts the `guardians` audience to these classes. `None` means all classes.
    #[serde(default)]
    pub class_ids: Option<Vec<ClassId>>,
    /// Optional image shown in the notification.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One audience entry of an announcement.
///
/// `guardians` resolves through students and their guardians. Any other
/// value names a user role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AudienceTag {
    /// Guardians of students, optionally scoped by class.
    Guardians,
    /// All users holding this role.
    Role(String),
}

impl AudienceTag {
    /// Wire name of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Guardians => "guardians",
            Self::Role(role) => role,
        }
    }
}

impl From<String> for AudienceTag {
    fn from(value: String) -> Self {
        if value == "guardians" {
            Self::Guardians
        } else {
            Self::Role(value)
        }
    }
}

impl From<&str> for AudienceTag {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AudienceTag> for String {
    fn from(tag: AudienceTag) -> Self {
        match tag {
            AudienceTag::Guardians => "guardians".to_string(),
            AudienceTag::Role(role) => role,
        }
    }
}

impl fmt::Display for AudienceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
