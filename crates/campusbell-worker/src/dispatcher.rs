//! Dispatcher tick: scan, claim, resolve devices, deliver, settle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing;

use campusbell_core::config::WorkerConfig;
use campusbell_core::result::AppResult;
use campusbell_core::types::JobId;
use campusbell_database::DeviceTokenStore;
use campusbell_entity::job::NotificationJob;
use campusbell_push::{DeliveryReport, PushAdapter, PushContent};

use crate::queue::DispatchQueue;

/// How a claimed job was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Delivered to at least the provider.
    Sent(DeliveryReport),
    /// Returned to pending until `at`.
    RetryScheduled {
        /// Why the attempt failed.
        reason: String,
        /// Next eligible time.
        at: DateTime<Utc>,
    },
    /// Attempts exhausted.
    Failed {
        /// Why the last attempt failed.
        reason: String,
    },
}

/// Counts from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Due jobs returned by the scan.
    pub scanned: usize,
    /// Jobs this tick won the claim for.
    pub claimed: usize,
    /// Jobs marked sent.
    pub sent: usize,
    /// Jobs put back with a backoff.
    pub retried: usize,
    /// Jobs marked failed.
    pub failed: usize,
    /// Claimed jobs whose settle write errored.
    pub errors: usize,
    /// The tick returned immediately because another was running.
    pub skipped_overlap: bool,
}

/// Clears the in-flight flag when the tick ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single logical consumer of the notification queue.
#[derive(Debug)]
pub struct Dispatcher {
    queue: DispatchQueue,
    devices: Arc<dyn DeviceTokenStore>,
    adapter: PushAdapter,
    batch_size: u32,
    no_device_backoff: Duration,
    provider_error_backoff: Duration,
    in_flight: AtomicBool,
    /// Claimed by this dispatcher and not yet settled.
    unsettled: Mutex<HashSet<JobId>>,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(
        queue: DispatchQueue,
        devices: Arc<dyn DeviceTokenStore>,
        adapter: PushAdapter,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            queue,
            devices,
            adapter,
            batch_size: config.batch_size.max(1),
            no_device_backoff: config.no_device_backoff(),
            provider_error_backoff: config.provider_error_backoff(),
            in_flight: AtomicBool::new(false),
            unsettled: Mutex::new(HashSet::new()),
        }
    }

    /// The queue this dispatcher consumes.
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// Jobs this dispatcher claimed whose final write has not happened.
    ///
    /// Non-empty after a tick was cancelled mid-job; those rows stay in
    /// `processing`.
    pub fn unsettled(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.unsettled_ids().iter().copied().collect();
        ids.sort();
        ids
    }

    fn unsettled_ids(&self) -> std::sync::MutexGuard<'_, HashSet<JobId>> {
        self.unsettled.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one scan-and-deliver pass.
    ///
    /// Returns immediately with `skipped_overlap` set if the previous tick
    /// of this dispatcher is still running. Jobs are handled one after
    /// another, oldest first.
    pub async fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Previous tick still running, skipping");
            summary.skipped_overlap = true;
            return summary;
        }
        let _guard = InFlight(&self.in_flight);

        let due = match self.queue.due(Utc::now(), self.batch_size).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan notification queue");
                return summary;
            }
        };
        summary.scanned = due.len();

        for candidate in due {
            let job = match self.queue.claim(&candidate).await {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(job_id = %candidate.id, error = %e, "Failed to claim job");
                    continue;
                }
            };
            summary.claimed += 1;

            let job_id = job.id;
            self.unsettled_ids().insert(job_id);
            let outcome = self.process_job(job).await;
            self.unsettled_ids().remove(&job_id);
            match outcome {
                Ok(JobOutcome::Sent(_)) => summary.sent += 1,
                Ok(JobOutcome::RetryScheduled { .. }) => summary.retried += 1,
                Ok(JobOutcome::Failed { .. }) => summary.failed += 1,
                Err(e) => {
                    summary.errors += 1;
                    tracing::error!(job_id = %job_id, error = %e, "Failed to settle job");
                }
            }
        }

        if summary.claimed > 0 {
            tracing::info!(
                scanned = summary.scanned,
                claimed = summary.claimed,
                sent = summary.sent,
                retried = summary.retried,
                failed = summary.failed,
                errors = summary.errors,
                "Dispatcher tick finished"
            );
        }
        summary
    }

    /// Deliver one claimed job and write its next state.
    ///
    /// `Err` means the settle write itself failed; delivery problems are
    /// reported through the outcome.
    pub async fn process_job(&self, job: NotificationJob) -> AppResult<JobOutcome> {
        let devices = match self.devices.find_active(job.tenant_id, job.user_id).await {
            Ok(devices) => devices,
            Err(e) => {
                let reason = format!("device lookup failed: {e}");
                return self.settle_failure(&job, reason, self.provider_error_backoff).await;
            }
        };

        if devices.is_empty() {
            return self
                .settle_failure(&job, "no active device tokens".to_string(), self.no_device_backoff)
                .await;
        }

        let tokens: Vec<String> = devices.into_iter().map(|d| d.token).collect();
        match self.adapter.send(&tokens, &PushContent::from_job(&job)).await {
            Ok(report) => {
                self.queue.complete(&job, Utc::now()).await?;
                tracing::debug!(
                    job_id = %job.id,
                    attempted = report.attempted,
                    accepted = report.accepted,
                    rejected = report.rejected,
                    skipped_invalid = report.skipped_invalid,
                    "Notification sent"
                );
                Ok(JobOutcome::Sent(report))
            }
            Err(e) => {
                self.settle_failure(&job, e.to_string(), self.provider_error_backoff)
                    .await
            }
        }
    }

    async fn settle_failure(
        &self,
        job: &NotificationJob,
        reason: String,
        backoff: Duration,
    ) -> AppResult<JobOutcome> {
        if job.attempts_exhausted() {
            self.queue.fail(job, &reason).await?;
            tracing::error!(
                job_id = %job.id,
                tenant_id = %job.tenant_id,
                user_id = %job.user_id,
                attempts = job.attempts,
                reason = %reason,
                "Notification failed permanently"
            );
            return Ok(JobOutcome::Failed { reason });
        }

        let at = Utc::now() + backoff;
        self.queue.retry(job, at, &reason).await?;
        tracing::warn!(
            job_id = %job.id,
            attempts = job.attempts,
            max_attempts = job.max_attempts,
            retry_at = %at,
            reason = %reason,
            "Notification attempt failed, retry scheduled"
        );
        Ok(JobOutcome::RetryScheduled { reason, at })
    }
}
