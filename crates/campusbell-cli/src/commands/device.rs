//! Device token registry commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use campusbell_core::error::AppError;
use campusbell_core::types::{TenantId, UserId};
use campusbell_database::DatabasePool;
use campusbell_database::repositories::DeviceTokenRepository;
use campusbell_entity::device::{DevicePlatform, DeviceToken, RegisterDevice};
use campusbell_service::DeviceService;

use crate::output::{self, OutputFormat};

/// Arguments for device commands
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device subcommand
    #[command(subcommand)]
    pub command: DeviceCommand,
}

/// Device subcommands
#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Register or refresh a device token
    Register {
        /// Tenant ID
        tenant: TenantId,
        /// User ID
        user: UserId,
        /// Stable client device identifier
        #[arg(long)]
        device_id: String,
        /// Push token
        #[arg(long)]
        token: String,
        /// ios, android or web
        #[arg(long)]
        platform: DevicePlatform,
        /// Human-readable label
        #[arg(long)]
        name: Option<String>,
    },
    /// Disable a device token
    Unregister {
        /// Tenant ID
        tenant: TenantId,
        /// User ID
        user: UserId,
        /// Device identifier
        device_id: String,
    },
    /// List a user's devices
    List {
        /// Tenant ID
        tenant: TenantId,
        /// User ID
        user: UserId,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    device_id: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: bool,
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Last Used")]
    last_used_at: String,
}

impl From<&DeviceToken> for DeviceRow {
    fn from(device: &DeviceToken) -> Self {
        Self {
            device_id: device.device_id.clone(),
            platform: device.platform.to_string(),
            name: output::or_dash(device.device_name.as_deref()),
            active: device.is_active,
            token: device.token.clone(),
            last_used_at: device.last_used_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute device commands
pub async fn execute(args: &DeviceArgs, pool: &DatabasePool, format: OutputFormat) -> Result<(), AppError> {
    let service = DeviceService::new(Arc::new(DeviceTokenRepository::new(pool.pool().clone())));

    match &args.command {
        DeviceCommand::Register {
            tenant,
            user,
            device_id,
            token,
            platform,
            name,
        } => {
            let device = service
                .register(
                    *tenant,
                    *user,
                    RegisterDevice {
                        device_id: device_id.clone(),
                        token: token.clone(),
                        platform: *platform,
                        device_name: name.clone(),
                    },
                )
                .await?;
            output::print_success(&format!(
                "Device '{}' registered (id: {})",
                device.device_id, device.id
            ));
        }
        DeviceCommand::Unregister {
            tenant,
            user,
            device_id,
        } => {
            service.unregister(*tenant, *user, device_id).await?;
            output::print_success(&format!("Device '{device_id}' unregistered"));
        }
        DeviceCommand::List { tenant, user } => {
            let devices = service.list(*tenant, *user).await?;
            let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
