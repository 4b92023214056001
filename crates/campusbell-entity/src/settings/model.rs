//! Notification settings entity.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campusbell_core::types::TenantId;

use crate::job::NotificationKind;

/// Per-tenant notification settings.
///
/// Only the four `*_enabled` flags are enforced by the pipeline. Quiet
/// hours, rate limits, and the batching window are stored for the admin
/// screens and are not applied to delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NotificationSettings {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Diary update notifications.
    pub diary_enabled: bool,
    /// Gallery post notifications.
    pub gallery_enabled: bool,
    /// Direct message notifications.
    pub message_enabled: bool,
    /// Announcement notifications.
    pub announcement_enabled: bool,
    /// Start of the quiet window.
    pub quiet_hours_start: Option<NaiveTime>,
    /// End of the quiet window.
    pub quiet_hours_end: Option<NaiveTime>,
    /// Hourly cap per user.
    pub max_per_user_hourly: Option<i32>,
    /// Daily cap per user.
    pub max_per_user_daily: Option<i32>,
    /// Batching window in seconds.
    pub batch_window_seconds: Option<i32>,
    /// When the settings were last changed.
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationSettings {
    /// Settings used when a tenant has no stored row: everything enabled.
    pub fn defaults_for(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            diary_enabled: true,
            gallery_enabled: true,
            message_enabled: true,
            announcement_enabled: true,
            quiet_hours_start: None,
            quiet_hours_end: None,
            max_per_user_hourly: None,
            max_per_user_daily: None,
            batch_window_seconds: None,
            updated_at: None,
        }
    }

    /// Whether notifications of `kind` are enabled for the tenant.
    pub fn is_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Message => self.message_enabled,
            NotificationKind::Diary => self.diary_enabled,
            NotificationKind::Announcement => self.announcement_enabled,
            NotificationKind::Gallery => self.gallery_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let settings = NotificationSettings::defaults_for(TenantId::new());
        assert!(settings.is_enabled(NotificationKind::Message));
        assert!(settings.is_enabled(NotificationKind::Diary));
        assert!(settings.is_enabled(NotificationKind::Announcement));
        assert!(settings.is_enabled(NotificationKind::Gallery));
    }

    #[test]
    fn test_flags_are_independent() {
        let settings = NotificationSettings {
            gallery_enabled: false,
            ..NotificationSettings::defaults_for(TenantId::new())
        };
        assert!(!settings.is_enabled(NotificationKind::Gallery));
        assert!(settings.is_enabled(NotificationKind::Diary));
    }
}
