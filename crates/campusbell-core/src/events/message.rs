//! Direct message events.

use serde::{Deserialize, Serialize};

use crate::types::{MessageId, TenantId, UserId};

/// A message was delivered into a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Tenant of the conversation.
    pub tenant_id: TenantId,
    /// The stored message.
    pub message_id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Display name of the author, embedded in the title.
    pub sender_name: String,
    /// The participant who should be notified.
    pub recipient_id: UserId,
    /// Message text.
    pub content: String,
}
