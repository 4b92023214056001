//! # campusbell-service
//!
//! Business logic around the notification queue. Services take their
//! stores as `Arc<dyn Trait>` at construction time, so the same code runs
//! against PostgreSQL or the in-memory stores.

pub mod device;
pub mod notification;
pub mod settings;

pub use device::DeviceService;
pub use notification::{NotificationService, NotificationTriggers, RecipientResolver};
pub use settings::SettingsService;
