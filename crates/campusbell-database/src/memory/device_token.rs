//! In-memory device token registry.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campusbell_core::result::AppResult;
use campusbell_core::types::{DeviceTokenId, TenantId, UserId};
use campusbell_entity::device::{DeviceToken, RegisterDevice};

use super::lock;
use crate::repositories::device_token::DeviceTokenStore;

/// Vec-backed device token registry.
#[derive(Debug, Default)]
pub struct InMemoryDeviceTokenStore {
    tokens: Mutex<Vec<DeviceToken>>,
}

impl InMemoryDeviceTokenStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, active or not.
    pub fn len(&self) -> usize {
        lock(&self.tokens).len()
    }

    /// Whether the registry has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DeviceTokenStore for InMemoryDeviceTokenStore {
    async fn upsert(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device: &RegisterDevice,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken> {
        let mut tokens = lock(&self.tokens);
        if let Some(existing) = tokens.iter_mut().find(|t| {
            t.tenant_id == tenant_id && t.user_id == user_id && t.device_id == device.device_id
        }) {
            existing.token = device.token.clone();
            existing.platform = device.platform;
            existing.device_name = device.device_name.clone();
            existing.is_active = true;
            existing.last_used_at = now;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let token = DeviceToken {
            id: DeviceTokenId::new(),
            tenant_id,
            user_id,
            device_id: device.device_id.clone(),
            token: device.token.clone(),
            platform: device.platform,
            device_name: device.device_name.clone(),
            is_active: true,
            last_used_at: now,
            created_at: now,
            updated_at: now,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn deactivate(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<bool> {
        let mut tokens = lock(&self.tokens);
        let Some(token) = tokens.iter_mut().find(|t| {
            t.tenant_id == tenant_id && t.user_id == user_id && t.device_id == device_id
        }) else {
            return Ok(false);
        };
        token.is_active = false;
        token.updated_at = Utc::now();
        Ok(true)
    }

    async fn find_active(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Vec<DeviceToken>> {
        let mut active: Vec<DeviceToken> = lock(&self.tokens)
            .iter()
            .filter(|t| t.tenant_id == tenant_id && t.user_id == user_id && t.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(active)
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Vec<DeviceToken>> {
        let mut all: Vec<DeviceToken> = lock(&self.tokens)
            .iter()
            .filter(|t| t.tenant_id == tenant_id && t.user_id == user_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(all)
    }
}
