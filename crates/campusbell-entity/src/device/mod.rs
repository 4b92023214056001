//! Device token entities.

pub mod model;
pub mod platform;

pub use model::{DeviceToken, RegisterDevice};
pub use platform::DevicePlatform;
