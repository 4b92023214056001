//! Tenant notification settings.

use std::sync::Arc;

use tracing::info;

use campusbell_core::result::AppResult;
use campusbell_core::types::TenantId;
use campusbell_database::NotificationSettingsStore;
use campusbell_entity::job::NotificationKind;
use campusbell_entity::settings::NotificationSettings;

/// Reads and writes per-tenant notification settings.
#[derive(Debug, Clone)]
pub struct SettingsService {
    store: Arc<dyn NotificationSettingsStore>,
}

impl SettingsService {
    /// Creates a new settings service.
    pub fn new(store: Arc<dyn NotificationSettingsStore>) -> Self {
        Self { store }
    }

    /// Stored settings, or the all-enabled defaults when the tenant has none.
    pub async fn effective(&self, tenant_id: TenantId) -> AppResult<NotificationSettings> {
        Ok(self
            .store
            .find(tenant_id)
            .await?
            .unwrap_or_else(|| NotificationSettings::defaults_for(tenant_id)))
    }

    /// Whether the tenant wants notifications of `kind`.
    pub async fn is_enabled(&self, tenant_id: TenantId, kind: NotificationKind) -> AppResult<bool> {
        Ok(self.effective(tenant_id).await?.is_enabled(kind))
    }

    /// Replace the tenant's settings.
    pub async fn update(&self, settings: NotificationSettings) -> AppResult<NotificationSettings> {
        let saved = self.store.upsert(&settings).await?;
        info!(
            tenant_id = %saved.tenant_id,
            message = saved.message_enabled,
            diary = saved.diary_enabled,
            announcement = saved.announcement_enabled,
            gallery = saved.gallery_enabled,
            "Notification settings updated"
        );
        Ok(saved)
    }
}
