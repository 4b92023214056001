//! Worker runner: drives dispatcher ticks until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};
use tracing;

use campusbell_core::config::WorkerConfig;

use crate::dispatcher::{Dispatcher, TickSummary};

/// Runs the dispatcher on a fixed interval, and early when woken.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Dispatcher executing the ticks
    dispatcher: Arc<Dispatcher>,
    /// Time between scheduled ticks
    poll_interval: Duration,
    /// How long shutdown waits for an in-flight tick
    shutdown_grace: Duration,
    /// Signalled by the fan-out side after enqueueing
    wake: Option<Arc<Notify>>,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(dispatcher: Arc<Dispatcher>, config: &WorkerConfig) -> Self {
        Self {
            dispatcher,
            poll_interval: config.poll_interval(),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_seconds),
            wake: None,
        }
    }

    /// Also tick whenever `wake` is notified
    pub fn with_wake(mut self, wake: Arc<Notify>) -> Self {
        self.wake = Some(wake);
        self
    }

    /// Run until the shutdown signal turns `true`
    ///
    /// Every tick runs in its own task so a slow tick never delays the
    /// timer; the dispatcher's in-flight flag turns overlapping ticks into
    /// no-ops. Missed intervals are skipped, not queued.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            wake_on_enqueue = self.wake.is_some(),
            "Notification worker started"
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks: JoinSet<TickSummary> = JoinSet::new();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Notification worker received shutdown signal");
                        break;
                    }
                }
                _ = interval.tick() => self.spawn_tick(&mut ticks),
                _ = wait_for_wake(self.wake.as_deref()) => {
                    tracing::debug!("Woken by enqueue");
                    self.spawn_tick(&mut ticks);
                }
            }

            while let Some(finished) = ticks.try_join_next() {
                if let Err(e) = finished {
                    tracing::error!(error = %e, "Dispatcher tick panicked");
                }
            }
        }

        tracing::info!("Waiting for in-flight tick to complete...");
        let drained = time::timeout(self.shutdown_grace, async {
            while ticks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            let stranded = self.dispatcher.unsettled();
            tracing::warn!(
                grace_seconds = self.shutdown_grace.as_secs(),
                stranded = stranded.len(),
                job_ids = ?stranded,
                "In-flight tick did not finish in time, aborting; its claimed jobs stay in processing"
            );
            ticks.abort_all();
        }

        tracing::info!("Notification worker shut down complete");
    }

    fn spawn_tick(&self, ticks: &mut JoinSet<TickSummary>) {
        let dispatcher = Arc::clone(&self.dispatcher);
        ticks.spawn(async move { dispatcher.tick().await });
    }
}

async fn wait_for_wake(wake: Option<&Notify>) {
    match wake {
        Some(notify) => notify.notified().await,
        None => std::future::pending().await,
    }
}
