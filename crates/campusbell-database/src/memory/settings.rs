//! In-memory settings store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use campusbell_core::result::AppResult;
use campusbell_core::types::TenantId;
use campusbell_entity::settings::NotificationSettings;

use super::lock;
use crate::repositories::settings::NotificationSettingsStore;

/// Map-backed settings store.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: Mutex<HashMap<TenantId, NotificationSettings>>,
}

impl InMemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationSettingsStore for InMemorySettingsStore {
    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<NotificationSettings>> {
        Ok(lock(&self.settings).get(&tenant_id).cloned())
    }

    async fn upsert(&self, settings: &NotificationSettings) -> AppResult<NotificationSettings> {
        let mut stored = settings.clone();
        stored.updated_at = Some(Utc::now());
        lock(&self.settings).insert(stored.tenant_id, stored.clone());
        Ok(stored)
    }
}
