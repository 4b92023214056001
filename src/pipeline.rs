//! Service wiring shared by the server binary and embedding applications.

use std::sync::Arc;

use tokio::sync::Notify;

use campusbell_core::config::WorkerConfig;
use campusbell_database::repositories::{
    DeviceTokenRepository, DirectoryRepository, NotificationQueueRepository,
    NotificationSettingsRepository,
};
use campusbell_database::{
    DatabasePool, DeviceTokenStore, NotificationQueueStore, NotificationSettingsStore,
    RecipientDirectory,
};
use campusbell_push::PushAdapter;
use campusbell_service::{
    DeviceService, NotificationService, NotificationTriggers, RecipientResolver, SettingsService,
};
use campusbell_worker::{DispatchQueue, Dispatcher, WorkerRunner};

/// The four stores the pipeline runs on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Notification queue.
    pub queue: Arc<dyn NotificationQueueStore>,
    /// Device token registry.
    pub devices: Arc<dyn DeviceTokenStore>,
    /// Relational lookups for recipient resolution.
    pub directory: Arc<dyn RecipientDirectory>,
    /// Tenant settings.
    pub settings: Arc<dyn NotificationSettingsStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        let pool = db.pool();
        Self {
            queue: Arc::new(NotificationQueueRepository::new(pool.clone())),
            devices: Arc::new(DeviceTokenRepository::new(pool.clone())),
            directory: Arc::new(DirectoryRepository::new(pool.clone())),
            settings: Arc::new(NotificationSettingsRepository::new(pool.clone())),
        }
    }
}

/// Fan-out, registry, inbox and dispatcher built over one set of stores.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Event triggers.
    pub triggers: NotificationTriggers,
    /// Device registration.
    pub devices: DeviceService,
    /// Inbox reads.
    pub inbox: NotificationService,
    /// Tenant settings.
    pub settings: SettingsService,
    /// Queue consumer.
    pub dispatcher: Arc<Dispatcher>,
    wake: Option<Arc<Notify>>,
    worker: WorkerConfig,
}

impl Pipeline {
    /// Wire every service. With `wake_on_enqueue`, the triggers signal the
    /// runner after each successful enqueue.
    pub fn new(stores: Stores, adapter: PushAdapter, worker: &WorkerConfig) -> Self {
        let settings = SettingsService::new(stores.settings);
        let wake = worker.wake_on_enqueue.then(|| Arc::new(Notify::new()));

        let mut triggers = NotificationTriggers::new(
            Arc::clone(&stores.queue),
            RecipientResolver::new(stores.directory),
            settings.clone(),
        )
        .with_max_attempts(worker.max_attempts);
        if let Some(wake) = &wake {
            triggers = triggers.with_wake(Arc::clone(wake));
        }

        let dispatcher = Arc::new(Dispatcher::new(
            DispatchQueue::new(Arc::clone(&stores.queue)),
            Arc::clone(&stores.devices),
            adapter,
            worker,
        ));

        Self {
            triggers,
            devices: DeviceService::new(stores.devices),
            inbox: NotificationService::new(stores.queue),
            settings,
            dispatcher,
            wake,
            worker: worker.clone(),
        }
    }

    /// A runner driving this pipeline's dispatcher.
    pub fn runner(&self) -> WorkerRunner {
        let runner = WorkerRunner::new(Arc::clone(&self.dispatcher), &self.worker);
        match &self.wake {
            Some(wake) => runner.with_wake(Arc::clone(wake)),
            None => runner,
        }
    }
}
