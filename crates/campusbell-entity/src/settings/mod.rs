//! Tenant notification settings.

pub mod model;

pub use model::NotificationSettings;
