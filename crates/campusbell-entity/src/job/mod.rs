//! Notification job entities.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{NewNotificationJob, NotificationJob};
pub use payload::{NotificationData, NotificationKind};
pub use status::{NotificationPriority, NotificationStatus};
