//! Device token registration.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use campusbell_core::error::AppError;
use campusbell_core::result::AppResult;
use campusbell_core::types::{TenantId, UserId};
use campusbell_database::DeviceTokenStore;
use campusbell_entity::device::{DeviceToken, RegisterDevice};

/// Registers and unregisters push endpoints for client devices.
#[derive(Debug, Clone)]
pub struct DeviceService {
    store: Arc<dyn DeviceTokenStore>,
}

impl DeviceService {
    /// Creates a new device service.
    pub fn new(store: Arc<dyn DeviceTokenStore>) -> Self {
        Self { store }
    }

    /// Register (or re-register) a device for a user.
    ///
    /// Re-registering the same `device_id` replaces the token in place and
    /// reactivates the row.
    pub async fn register(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        request: RegisterDevice,
    ) -> AppResult<DeviceToken> {
        request
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid device registration: {e}")))?;

        let device = self
            .store
            .upsert(tenant_id, user_id, &request, Utc::now())
            .await?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            device_id = %device.device_id,
            platform = %device.platform,
            "Device registered"
        );
        Ok(device)
    }

    /// Soft-disable a device. Unknown devices are reported as not found.
    pub async fn unregister(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        device_id: &str,
    ) -> AppResult<()> {
        if !self.store.deactivate(tenant_id, user_id, device_id).await? {
            return Err(AppError::not_found(format!("Device '{device_id}' not found")));
        }
        info!(tenant_id = %tenant_id, user_id = %user_id, device_id, "Device unregistered");
        Ok(())
    }

    /// Every device of a user, including disabled ones.
    pub async fn list(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        self.store.list_for_user(tenant_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusbell_core::error::ErrorKind;
    use campusbell_database::memory::InMemoryDeviceTokenStore;
    use campusbell_entity::device::DevicePlatform;

    fn request(token: &str) -> RegisterDevice {
        RegisterDevice {
            device_id: "pixel-8".into(),
            token: token.into(),
            platform: DevicePlatform::Android,
            device_name: None,
        }
    }

    #[tokio::test]
    async fn test_register_twice_keeps_one_row() {
        let store = Arc::new(InMemoryDeviceTokenStore::new());
        let service = DeviceService::new(store.clone());
        let (tenant, user) = (TenantId::new(), UserId::new());

        service.register(tenant, user, request("ExponentPushToken[old]")).await.unwrap();
        service.register(tenant, user, request("ExponentPushToken[new]")).await.unwrap();

        let devices = service.list(tenant, user).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].token, "ExponentPushToken[new]");
        assert!(devices[0].is_active);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_token() {
        let service = DeviceService::new(Arc::new(InMemoryDeviceTokenStore::new()));
        let err = service
            .register(TenantId::new(), UserId::new(), request(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unregister_unknown_device() {
        let service = DeviceService::new(Arc::new(InMemoryDeviceTokenStore::new()));
        let err = service
            .unregister(TenantId::new(), UserId::new(), "ghost")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
