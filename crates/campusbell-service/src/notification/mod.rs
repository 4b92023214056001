//! Fan-out triggers, recipient resolution and the inbox read path.

pub mod rules;
pub mod service;
pub mod triggers;

pub use rules::RecipientResolver;
pub use service::NotificationService;
pub use triggers::NotificationTriggers;
