//! # campusbell-database
//!
//! PostgreSQL connection management, migrations, and the stores backing
//! the notification pipeline. Each store is a trait with a PostgreSQL
//! implementation in [`repositories`] and an in-memory one in [`memory`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    DeviceTokenStore, NotificationQueueStore, NotificationSettingsStore, QueueStats,
    RecipientDirectory,
};
