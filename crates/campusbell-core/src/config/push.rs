//! Push provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the external push-delivery provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Send endpoint of the provider.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Optional bearer token for authenticated push access.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Provider ceiling on messages per request.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Sound played on delivery.
    #[serde(default = "default_sound")]
    pub sound: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            access_token: None,
            max_batch_size: default_max_batch_size(),
            request_timeout_seconds: default_request_timeout(),
            sound: default_sound(),
        }
    }
}

fn default_endpoint() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_max_batch_size() -> usize {
    100
}

fn default_request_timeout() -> u64 {
    10
}

fn default_sound() -> String {
    "default".to_string()
}
