//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Barrier;

use campusbell::{Pipeline, Stores};
use campusbell_core::config::WorkerConfig;
use campusbell_core::result::AppResult;
use campusbell_core::types::{ClassId, JobId, StudentId, TenantId, UserId};
use campusbell_database::memory::{
    InMemoryDeviceTokenStore, InMemoryDirectory, InMemoryQueueStore, InMemorySettingsStore,
};
use campusbell_database::{NotificationQueueStore, QueueStats};
use campusbell_entity::device::{DevicePlatform, RegisterDevice};
use campusbell_entity::job::{NewNotificationJob, NotificationJob};
use campusbell_push::{MockPushProvider, PushAdapter};

/// Test application context
pub struct TestApp {
    /// Fully wired pipeline
    pub pipeline: Pipeline,
    /// Queue contents, for direct inspection
    pub queue: Arc<InMemoryQueueStore>,
    /// Registry contents
    pub devices: Arc<InMemoryDeviceTokenStore>,
    /// Seeded students, guardians and roles
    pub directory: Arc<InMemoryDirectory>,
    /// Scripted push provider
    pub provider: Arc<MockPushProvider>,
    /// Stores handed to the pipeline, for building a second dispatcher
    pub stores: Stores,
    /// Tenant used by the test
    pub tenant: TenantId,
}

impl TestApp {
    /// Create a pipeline with default worker settings
    pub fn new() -> Self {
        Self::with_worker(WorkerConfig::default())
    }

    /// Create a pipeline with custom worker settings
    pub fn with_worker(worker: WorkerConfig) -> Self {
        let queue = Arc::new(InMemoryQueueStore::new());
        let devices = Arc::new(InMemoryDeviceTokenStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let provider = Arc::new(MockPushProvider::default());

        let stores = Stores {
            queue: queue.clone(),
            devices: devices.clone(),
            directory: directory.clone(),
            settings: Arc::new(InMemorySettingsStore::new()),
        };
        let pipeline = Pipeline::new(
            stores.clone(),
            PushAdapter::new(provider.clone(), Some("default".into())),
            &worker,
        );

        Self {
            pipeline,
            queue,
            devices,
            directory,
            provider,
            stores,
            tenant: TenantId::new(),
        }
    }

    /// Add a student in `class` with one new guardian, returning the guardian
    pub fn student_with_guardian(&self, class: Option<ClassId>) -> (StudentId, UserId) {
        let student = StudentId::new();
        let guardian = UserId::new();
        self.directory.add_student(self.tenant, student, class);
        self.directory.add_guardian(self.tenant, student, guardian);
        (student, guardian)
    }

    /// Register one device for `user` with a valid token
    pub async fn register_device(&self, user: UserId, device_id: &str) -> String {
        let token = format!("ExponentPushToken[{device_id}]");
        self.pipeline
            .devices
            .register(
                self.tenant,
                user,
                RegisterDevice {
                    device_id: device_id.to_string(),
                    token: token.clone(),
                    platform: DevicePlatform::Ios,
                    device_name: None,
                },
            )
            .await
            .expect("device registration");
        token
    }

    /// Current state of every job
    pub fn jobs(&self) -> Vec<NotificationJob> {
        self.queue.all()
    }

    /// Move every pending job's schedule into the past
    pub fn make_all_due(&self) {
        for mut job in self.queue.all() {
            if job.scheduled_for.is_some_and(|at| at > Utc::now()) {
                job.scheduled_for = Some(Utc::now() - chrono::Duration::seconds(1));
                self.queue.put(job);
            }
        }
    }
}

/// Queue wrapper whose scans wait for each other.
///
/// Every `find_due` holds its result until `parties` scans have run, so
/// dispatchers sharing it claim from the same due set at the same time.
#[derive(Debug)]
pub struct LockstepScans {
    inner: Arc<dyn NotificationQueueStore>,
    barrier: Barrier,
    scans: Mutex<Vec<Vec<JobId>>>,
}

impl LockstepScans {
    /// Wrap `inner` for `parties` concurrent scanners
    pub fn new(inner: Arc<dyn NotificationQueueStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
            scans: Mutex::new(Vec::new()),
        }
    }

    /// Job ids returned by each scan so far
    pub fn scans(&self) -> Vec<Vec<JobId>> {
        self.scans.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl NotificationQueueStore for LockstepScans {
    async fn insert_many(&self, jobs: Vec<NewNotificationJob>) -> AppResult<Vec<NotificationJob>> {
        self.inner.insert_many(jobs).await
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        self.inner.find_by_id(id).await
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<NotificationJob>> {
        let due = self.inner.find_due(now, limit).await?;
        self.scans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(due.iter().map(|j| j.id).collect());
        self.barrier.wait().await;
        Ok(due)
    }

    async fn claim(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        let claimed = self.inner.claim(id).await;
        tokio::task::yield_now().await;
        claimed
    }

    async fn mark_sent(&self, id: JobId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        self.inner.mark_sent(id, sent_at).await
    }

    async fn reschedule(&self, id: JobId, at: DateTime<Utc>, reason: &str) -> AppResult<bool> {
        self.inner.reschedule(id, at, reason).await
    }

    async fn mark_failed(&self, id: JobId, reason: &str) -> AppResult<bool> {
        self.inner.mark_failed(id, reason).await
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        limit: u32,
    ) -> AppResult<Vec<NotificationJob>> {
        self.inner.list_for_user(tenant_id, user_id, limit).await
    }

    async fn stats(&self, tenant_id: Option<TenantId>) -> AppResult<QueueStats> {
        self.inner.stats(tenant_id).await
    }
}
