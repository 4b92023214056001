//! Batched delivery on top of a [`PushProvider`].

use std::sync::Arc;

use tracing::{debug, warn};

use campusbell_core::config::PushConfig;
use campusbell_core::result::AppResult;
use campusbell_entity::job::{NotificationJob, NotificationPriority};

use crate::expo::ExpoPushProvider;
use crate::message::PushMessage;
use crate::provider::PushProvider;
use crate::token::is_valid_push_token;

/// What to show on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct PushContent {
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Structured payload for the client app.
    pub data: serde_json::Value,
    /// Optional image.
    pub image_url: Option<String>,
    /// Provider priority hint.
    pub priority: NotificationPriority,
}

impl PushContent {
    /// Content of a queued job.
    pub fn from_job(job: &NotificationJob) -> Self {
        Self {
            title: job.title.clone(),
            body: job.body.clone(),
            data: job.data.to_value(),
            image_url: job.image_url.clone(),
            priority: job.priority,
        }
    }
}

/// Counts from one delivery call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages submitted to the provider.
    pub attempted: usize,
    /// Tickets with status `ok`.
    pub accepted: usize,
    /// Tickets with status `error`.
    pub rejected: usize,
    /// Tokens dropped before submission.
    pub skipped_invalid: usize,
}

/// Validates tokens, chunks them and submits to the provider.
#[derive(Debug, Clone)]
pub struct PushAdapter {
    provider: Arc<dyn PushProvider>,
    sound: Option<String>,
}

impl PushAdapter {
    /// Wrap a provider. `sound` is attached to every message.
    pub fn new(provider: Arc<dyn PushProvider>, sound: Option<String>) -> Self {
        Self { provider, sound }
    }

    /// Adapter over the HTTP provider described by `config`.
    pub fn from_config(config: &PushConfig) -> AppResult<Self> {
        let provider = ExpoPushProvider::new(config)?;
        let sound = Some(config.sound.clone()).filter(|s| !s.is_empty());
        Ok(Self::new(Arc::new(provider), sound))
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &Arc<dyn PushProvider> {
        &self.provider
    }

    /// Deliver `content` to every valid token.
    ///
    /// Rejected tickets are logged and counted, never raised. Only a failed
    /// submission returns `Err`; chunks submitted before it stay submitted.
    pub async fn send(&self, tokens: &[String], content: &PushContent) -> AppResult<DeliveryReport> {
        let mut report = DeliveryReport::default();

        let valid: Vec<&String> = tokens
            .iter()
            .filter(|token| {
                let ok = is_valid_push_token(token);
                if !ok {
                    debug!(token = %token, "Skipping invalid push token");
                }
                ok
            })
            .collect();
        report.skipped_invalid = tokens.len() - valid.len();

        if valid.is_empty() {
            debug!("No valid push tokens, nothing to send");
            return Ok(report);
        }

        let messages: Vec<PushMessage> = valid
            .into_iter()
            .map(|token| PushMessage {
                to: token.clone(),
                title: content.title.clone(),
                body: content.body.clone(),
                data: content.data.clone(),
                sound: self.sound.clone(),
                priority: Some(content.priority.as_str().to_string()),
                image: content.image_url.clone(),
            })
            .collect();

        for chunk in messages.chunks(self.provider.max_batch_size().max(1)) {
            report.attempted += chunk.len();
            let tickets = self.provider.send_chunk(chunk).await?;

            for (message, ticket) in chunk.iter().zip(tickets.iter()) {
                if ticket.is_ok() {
                    report.accepted += 1;
                } else {
                    report.rejected += 1;
                    warn!(
                        provider = self.provider.name(),
                        token = %message.to,
                        message = ticket.message.as_deref().unwrap_or(""),
                        details = ?ticket.details,
                        "Push ticket rejected"
                    );
                }
            }
            if tickets.len() != chunk.len() {
                warn!(
                    provider = self.provider.name(),
                    expected = chunk.len(),
                    received = tickets.len(),
                    "Ticket count does not match chunk size"
                );
            }
        }

        Ok(report)
    }
}
