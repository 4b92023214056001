//! Store traits and their PostgreSQL implementations.

pub mod device_token;
pub mod directory;
pub mod queue;
pub mod settings;

pub use device_token::{DeviceTokenRepository, DeviceTokenStore};
pub use directory::{DirectoryRepository, RecipientDirectory};
pub use queue::{NotificationQueueRepository, NotificationQueueStore, QueueStats};
pub use settings::{NotificationSettingsRepository, NotificationSettingsStore};
