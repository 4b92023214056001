//! Tenant notification settings store.

use async_trait::async_trait;
use sqlx::PgPool;

use campusbell_core::error::{AppError, ErrorKind};
use campusbell_core::result::AppResult;
use campusbell_core::types::TenantId;
use campusbell_entity::settings::NotificationSettings;

/// Per-tenant notification settings.
#[async_trait]
pub trait NotificationSettingsStore: Send + Sync + std::fmt::Debug + 'static {
    /// Stored settings for a tenant, if any.
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<NotificationSettings>>;

    /// Replace the settings row of a tenant.
    async fn upsert(&self, settings: &NotificationSettings) -> AppResult<NotificationSettings>;
}

/// PostgreSQL-backed settings store.
#[derive(Debug, Clone)]
pub struct NotificationSettingsRepository {
    pool: PgPool,
}

impl NotificationSettingsRepository {
    /// Create a new settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSettingsStore for NotificationSettingsRepository {
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<NotificationSettings>> {
        sqlx::query_as::<_, NotificationSettings>(
            "SELECT * FROM notification_settings WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load settings", e))
    }

    async fn upsert(&self, settings: &NotificationSettings) -> AppResult<NotificationSettings> {
        sqlx::query_as::<_, NotificationSettings>(
            "INSERT INTO notification_settings \
             (tenant_id, diary_enabled, gallery_enabled, message_enabled, announcement_enabled, \
              quiet_hours_start, quiet_hours_end, max_per_user_hourly, max_per_user_daily, \
              batch_window_seconds, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
             ON CONFLICT (tenant_id) DO UPDATE SET \
             diary_enabled = EXCLUDED.diary_enabled, \
             gallery_enabled = EXCLUDED.gallery_enabled, \
             message_enabled = EXCLUDED.message_enabled, \
             announcement_enabled = EXCLUDED.announcement_enabled, \
             quiet_hours_start = EXCLUDED.quiet_hours_start, \
             quiet_hours_end = EXCLUDED.quiet_hours_end, \
             max_per_user_hourly = EXCLUDED.max_per_user_hourly, \
             max_per_user_daily = EXCLUDED.max_per_user_daily, \
             batch_window_seconds = EXCLUDED.batch_window_seconds, \
             updated_at = NOW() \
             RETURNING *",
        )
        .bind(settings.tenant_id)
        .bind(settings.diary_enabled)
        .bind(settings.gallery_enabled)
        .bind(settings.message_enabled)
        .bind(settings.announcement_enabled)
        .bind(settings.quiet_hours_start)
        .bind(settings.quiet_hours_end)
        .bind(settings.max_per_user_hourly)
        .bind(settings.max_per_user_daily)
        .bind(settings.batch_window_seconds)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save settings", e))
    }
}
