//! Dispatcher worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound applied to configured retry backoffs (seven days).
pub const MAX_BACKOFF_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Notification dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the dispatcher runs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in milliseconds between dispatcher ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Maximum number of due jobs scanned per tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Attempts allowed per job before it is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Delay before retrying a job whose recipient has no active device.
    #[serde(default = "default_no_device_backoff")]
    pub no_device_backoff_seconds: u64,
    /// Delay before retrying a job whose provider submission failed.
    #[serde(default = "default_provider_error_backoff")]
    pub provider_error_backoff_seconds: u64,
    /// Start a tick early when new jobs are enqueued in this process.
    #[serde(default = "default_true")]
    pub wake_on_enqueue: bool,
    /// Seconds to wait for an in-flight tick on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl WorkerConfig {
    /// Tick interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Short backoff used when no device token is registered yet.
    pub fn no_device_backoff(&self) -> chrono::Duration {
        backoff(self.no_device_backoff_seconds)
    }

    /// Longer backoff used after a provider-level failure.
    pub fn provider_error_backoff(&self) -> chrono::Duration {
        backoff(self.provider_error_backoff_seconds)
    }
}

/// Clamped to [`MAX_BACKOFF_SECONDS`] so the retry time stays representable.
fn backoff(seconds: u64) -> chrono::Duration {
    chrono::Duration::seconds(seconds.min(MAX_BACKOFF_SECONDS) as i64)
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            no_device_backoff_seconds: default_no_device_backoff(),
            provider_error_backoff_seconds: default_provider_error_backoff(),
            wake_on_enqueue: true,
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_batch_size() -> u32 {
    10
}

fn default_max_attempts() -> i32 {
    3
}

fn default_no_device_backoff() -> u64 {
    15
}

fn default_provider_error_backoff() -> u64 {
    30
}

fn default_shutdown_grace() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoffs() {
        let config = WorkerConfig::default();
        assert_eq!(config.no_device_backoff(), chrono::Duration::seconds(15));
        assert_eq!(config.provider_error_backoff(), chrono::Duration::seconds(30));
    }

    #[test]
    fn test_oversized_backoffs_are_clamped() {
        let config = WorkerConfig {
            no_device_backoff_seconds: u64::MAX,
            provider_error_backoff_seconds: i64::MAX as u64 + 1,
            ..WorkerConfig::default()
        };
        let week = chrono::Duration::days(7);

        assert_eq!(config.no_device_backoff(), week);
        assert_eq!(config.provider_error_backoff(), week);
        assert!(chrono::Utc::now().checked_add_signed(week).is_some());
    }
}
