//! Device token registry store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campusbell_core::error::{AppError, ErrorKind};
use campusbell_core::result::AppResult;
use campusbell_core::types::{DeviceTokenId, TenantId, UserId};
use campusbell_entity::device::{DeviceToken, RegisterDevice};

/// Registry of push endpoints per (tenant, user, device).
#[async_trait]
pub trait DeviceTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert or update the row for `(tenant, user, device_id)`.
    ///
    /// An existing row gets the new token, platform and name, becomes
    /// active, and has `last_used_at` bumped to `now`.
    async fn upsert(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device: &RegisterDevice,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken>;

    /// Soft-disable a device. Returns `false` if no such row exists.
    async fn deactivate(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<bool>;

    /// Active tokens for a user.
    async fn find_active(&self, tenant_id: TenantId, user_id: UserId)
    -> AppResult<Vec<DeviceToken>>;

    /// All rows for a user, active or not, most recently used first.
    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Vec<DeviceToken>>;
}

/// PostgreSQL-backed device token registry.
#[derive(Debug, Clone)]
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    /// Create a new device token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStore for DeviceTokenRepository {
    async fn upsert(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device: &RegisterDevice,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken> {
        sqlx::query_as::<_, DeviceToken>(
            "INSERT INTO device_tokens \
             (id, tenant_id, user_id, device_id, token, platform, device_name, is_active, last_used_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8, $8) \
             ON CONFLICT (tenant_id, user_id, device_id) DO UPDATE SET \
             token = EXCLUDED.token, platform = EXCLUDED.platform, \
             device_name = EXCLUDED.device_name, is_active = TRUE, \
             last_used_at = EXCLUDED.last_used_at, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(DeviceTokenId::new())
        .bind(tenant_id)
        .bind(user_id)
        .bind(&device.device_id)
        .bind(&device.token)
        .bind(device.platform)
        .bind(&device.device_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register device", e))
    }

    async fn deactivate(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE device_tokens SET is_active = FALSE, updated_at = NOW() \
             WHERE tenant_id = $1 AND user_id = $2 AND device_id = $3",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unregister device", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_active(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Vec<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens \
             WHERE tenant_id = $1 AND user_id = $2 AND is_active \
             ORDER BY last_used_at DESC",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load active devices", e)
        })
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> AppResult<Vec<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens WHERE tenant_id = $1 AND user_id = $2 \
             ORDER BY last_used_at DESC",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list devices", e))
    }
}
