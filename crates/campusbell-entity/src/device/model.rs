//! Device token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use campusbell_core::types::{DeviceTokenId, TenantId, UserId};

use super::platform::DevicePlatform;

/// A push endpoint registered for one device of one user.
///
/// Unique per `(tenant_id, user_id, device_id)`. Rows are soft-disabled,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeviceToken {
    /// Row identifier.
    pub id: DeviceTokenId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning user.
    pub user_id: UserId,
    /// Client-generated stable device identifier.
    pub device_id: String,
    /// Provider-specific push token.
    pub token: String,
    /// Device platform.
    pub platform: DevicePlatform,
    /// Optional human-readable label.
    pub device_name: Option<String>,
    /// Whether the token receives pushes.
    pub is_active: bool,
    /// Last registration or use.
    pub last_used_at: DateTime<Utc>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// Registration request sent by a client on login or app start.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDevice {
    /// Client-generated stable device identifier.
    #[validate(length(min = 1, max = 255))]
    pub device_id: String,
    /// Provider-specific push token.
    #[validate(length(min = 1, max = 512))]
    pub token: String,
    /// Device platform.
    pub platform: DevicePlatform,
    /// Optional label.
    #[validate(length(max = 255))]
    pub device_name: Option<String>,
}
