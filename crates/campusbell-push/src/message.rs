//! Wire types exchanged with the push provider.

use serde::{Deserialize, Serialize};

/// One message addressed to one endpoint token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Endpoint token.
    pub to: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Payload handed to the client app.
    pub data: serde_json::Value,
    /// Sound played on delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// `normal` or `high`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Image shown with the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Outcome reported by the provider for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Accepted for delivery.
    Ok,
    /// Rejected.
    Error,
}

/// Per-message delivery ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushTicket {
    /// Accepted or rejected.
    pub status: TicketStatus,
    /// Provider receipt id for accepted messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Provider-specific error details, e.g. `{"error": "DeviceNotRegistered"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PushTicket {
    /// An accepted ticket.
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            status: TicketStatus::Ok,
            id: Some(id.into()),
            message: None,
            details: None,
        }
    }

    /// A rejected ticket.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TicketStatus::Error,
            id: None,
            message: Some(message.into()),
            details: None,
        }
    }

    /// Whether the provider accepted the message.
    pub fn is_ok(&self) -> bool {
        self.status == TicketStatus::Ok
    }
}
