//! # campusbell-push
//!
//! Delivery to the external push provider. [`PushAdapter`] validates
//! endpoint tokens, chunks them to the provider's per-request ceiling and
//! reports per-token tickets. Providers implement [`PushProvider`].

pub mod adapter;
pub mod expo;
pub mod message;
pub mod mock;
pub mod provider;
pub mod token;

pub use adapter::{DeliveryReport, PushAdapter, PushContent};
pub use expo::ExpoPushProvider;
pub use message::{PushMessage, PushTicket, TicketStatus};
pub use mock::MockPushProvider;
pub use provider::PushProvider;
pub use token::is_valid_push_token;
