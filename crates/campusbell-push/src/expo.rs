//! Expo-compatible HTTP push provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use campusbell_core::config::PushConfig;
use campusbell_core::error::{AppError, ErrorKind};
use campusbell_core::result::AppResult;

use crate::message::{PushMessage, PushTicket};
use crate::provider::PushProvider;

/// Response envelope of the send endpoint.
#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    data: Vec<PushTicket>,
    #[serde(default)]
    errors: Vec<RequestError>,
}

/// Request-level error reported instead of tickets.
#[derive(Debug, Deserialize)]
struct RequestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Posts message chunks as a JSON array to the configured endpoint.
#[derive(Debug, Clone)]
pub struct ExpoPushProvider {
    http_client: Client,
    endpoint: String,
    access_token: Option<String>,
    max_batch_size: usize,
}

impl ExpoPushProvider {
    /// Build a provider from configuration.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
            max_batch_size: config.max_batch_size.max(1),
        })
    }
}

#[async_trait]
impl PushProvider for ExpoPushProvider {
    fn name(&self) -> &'static str {
        "expo"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn send_chunk(&self, messages: &[PushMessage]) -> AppResult<Vec<PushTicket>> {
        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(messages);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Push request failed", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(format!(
                "Push provider returned {status}: {body}"
            )));
        }

        let parsed: SendResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Unreadable push provider response",
                e,
            )
        })?;

        if let Some(first) = parsed.errors.first() {
            return Err(AppError::external(format!(
                "Push provider rejected request: {} ({})",
                first.message,
                first.code.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(parsed.data)
    }
}
