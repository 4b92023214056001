//! In-memory notification queue.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campusbell_core::result::AppResult;
use campusbell_core::types::{JobId, TenantId, UserId};
use campusbell_entity::job::{NewNotificationJob, NotificationJob, NotificationStatus};

use super::lock;
use crate::repositories::queue::{NotificationQueueStore, QueueStats};

/// Vec-backed queue. Rows are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    jobs: Mutex<Vec<NotificationJob>>,
}

impl InMemoryQueueStore {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a job exactly as given, bypassing the insert defaults.
    pub fn put(&self, job: NotificationJob) {
        let mut jobs = lock(&self.jobs);
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => *existing = job,
            None => jobs.push(job),
        }
    }

    /// Snapshot of every stored job.
    pub fn all(&self) -> Vec<NotificationJob> {
        lock(&self.jobs).clone()
    }

    /// Apply `update` to a job currently in `processing`.
    fn update_processing(&self, id: JobId, update: impl FnOnce(&mut NotificationJob)) -> bool {
        let mut jobs = lock(&self.jobs);
        match jobs
            .iter_mut()
            .find(|j| j.id == id && j.status == NotificationStatus::Processing)
        {
            Some(job) => {
                update(job);
                job.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl NotificationQueueStore for InMemoryQueueStore {
    async fn insert_many(&self, jobs: Vec<NewNotificationJob>) -> AppResult<Vec<NotificationJob>> {
        let now = Utc::now();
        let created: Vec<NotificationJob> = jobs
            .into_iter()
            .map(|job| job.into_job(JobId::new(), now))
            .collect();
        lock(&self.jobs).extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        Ok(lock(&self.jobs).iter().find(|j| j.id == id).cloned())
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<NotificationJob>> {
        let mut due: Vec<NotificationJob> = lock(&self.jobs)
            .iter()
            .filter(|j| j.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|j| (j.created_at, j.id));
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn claim(&self, id: JobId) -> AppResult<Option<NotificationJob>> {
        let mut jobs = lock(&self.jobs);
        let Some(job) = jobs
            .iter_mut()
            .find(|j| j.id == id && j.status == NotificationStatus::Pending)
        else {
            return Ok(None);
        };
        job.status = NotificationStatus::Processing;
        job.attempts += 1;
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn mark_sent(&self, id: JobId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        Ok(self.update_processing(id, |job| {
            job.status = NotificationStatus::Sent;
            job.sent_at = Some(sent_at);
            job.scheduled_for = None;
            job.last_error = None;
        }))
    }

    async fn reschedule(&self, id: JobId, at: DateTime<Utc>, reason: &str) -> AppResult<bool> {
        Ok(self.update_processing(id, |job| {
            job.status = NotificationStatus::Pending;
            job.scheduled_for = Some(at);
            job.last_error = Some(reason.to_string());
        }))
    }

    async fn mark_failed(&self, id: JobId, reason: &str) -> AppResult<bool> {
        Ok(self.update_processing(id, |job| {
            job.status = NotificationStatus::Failed;
            job.scheduled_for = None;
            job.last_error = Some(reason.to_string());
        }))
    }

    async fn list_for_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        limit: u32,
    ) -> AppResult<Vec<NotificationJob>> {
        let mut jobs: Vec<NotificationJob> = lock(&self.jobs)
            .iter()
            .rev()
            .filter(|j| j.tenant_id == tenant_id && j.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit as usize);
        Ok(jobs)
    }

    async fn stats(&self, tenant_id: Option<TenantId>) -> AppResult<QueueStats> {
        let mut stats = QueueStats::default();
        for job in lock(&self.jobs)
            .iter()
            .filter(|j| tenant_id.is_none_or(|t| j.tenant_id == t))
        {
            stats.record(job.status, 1);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use campusbell_core::types::{MessageId, UserId};
    use campusbell_entity::job::{NotificationData, NotificationPriority};
    use chrono::Duration;

    fn new_job(tenant_id: TenantId, user_id: UserId) -> NewNotificationJob {
        NewNotificationJob {
            tenant_id,
            user_id,
            title: "New message from Ms. Ito".into(),
            body: "See you tomorrow".into(),
            data: NotificationData::NewMessage {
                sender_id: UserId::new(),
                message_id: MessageId::new(),
            },
            image_url: None,
            priority: NotificationPriority::Normal,
            max_attempts: 3,
            scheduled_for: None,
            batch_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_starts_pending() {
        let store = InMemoryQueueStore::new();
        let tenant = TenantId::new();
        let created = store
            .insert_many(vec![new_job(tenant, UserId::new()), new_job(tenant, UserId::new())])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|j| j.status == NotificationStatus::Pending));
        assert!(created.iter().all(|j| j.attempts == 0));
        assert_eq!(store.stats(Some(tenant)).await.unwrap().pending, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_claim_is_exclusive() {
        let store = Arc::new(InMemoryQueueStore::new());
        let tenant = TenantId::new();
        let ids: Vec<JobId> = store
            .insert_many((0..50).map(|_| new_job(tenant, UserId::new())).collect())
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        let start = Arc::new(Barrier::new(2));

        let claimer = |ids: Vec<JobId>| {
            let store = Arc::clone(&store);
            let start = Arc::clone(&start);
            tokio::spawn(async move {
                start.wait().await;
                let mut won = Vec::new();
                for id in ids {
                    if store.claim(id).await.unwrap().is_some() {
                        won.push(id);
                    }
                    tokio::task::yield_now().await;
                }
                won
            })
        };
        let forward = claimer(ids.clone());
        let backward = claimer(ids.iter().rev().copied().collect());
        let (a, b) = (forward.await.unwrap(), backward.await.unwrap());

        assert_eq!(a.len() + b.len(), ids.len());
        let winners: HashSet<JobId> = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(winners.len(), ids.len());
        for job in store.all() {
            assert_eq!(job.status, NotificationStatus::Processing);
            assert_eq!(job.attempts, 1);
        }
    }

    #[tokio::test]
    async fn test_find_due_orders_siblings_by_id() {
        let store = InMemoryQueueStore::new();
        let tenant = TenantId::new();
        let now = Utc::now();
        let mut siblings = store
            .insert_many((0..5).map(|_| new_job(tenant, UserId::new())).collect())
            .await
            .unwrap();
        let mut oldest = store
            .insert_many(vec![new_job(tenant, UserId::new())])
            .await
            .unwrap()
            .remove(0);
        oldest.created_at = now - Duration::minutes(5);
        store.put(oldest.clone());

        let due: Vec<JobId> = store.find_due(now, 10).await.unwrap().iter().map(|j| j.id).collect();

        siblings.sort_by_key(|j| j.id);
        let mut expected = vec![oldest.id];
        expected.extend(siblings.iter().map(|j| j.id));
        assert_eq!(due, expected);
    }

    #[tokio::test]
    async fn test_find_due_skips_future_and_claimed() {
        let store = InMemoryQueueStore::new();
        let tenant = TenantId::new();
        let now = Utc::now();
        let mut jobs = store
            .insert_many(vec![
                new_job(tenant, UserId::new()),
                new_job(tenant, UserId::new()),
                new_job(tenant, UserId::new()),
            ])
            .await
            .unwrap();

        let mut later = jobs.remove(1);
        later.scheduled_for = Some(now + Duration::seconds(30));
        store.put(later);
        store.claim(jobs[1].id).await.unwrap();

        let due = store.find_due(now, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, jobs[0].id);
    }

    #[tokio::test]
    async fn test_terminal_updates_require_processing() {
        let store = InMemoryQueueStore::new();
        let job = store
            .insert_many(vec![new_job(TenantId::new(), UserId::new())])
            .await
            .unwrap()
            .remove(0);

        assert!(!store.mark_sent(job.id, Utc::now()).await.unwrap());

        store.claim(job.id).await.unwrap();
        assert!(store.mark_sent(job.id, Utc::now()).await.unwrap());
        assert!(!store.mark_failed(job.id, "late").await.unwrap());
        assert!(!store
            .reschedule(job.id, Utc::now(), "late")
            .await
            .unwrap());

        let stored = store.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert!(stored.sent_at.is_some());
        assert!(stored.last_error.is_none());
    }

    #[tokio::test]
    async fn test_reschedule_keeps_attempts() {
        let store = InMemoryQueueStore::new();
        let job = store
            .insert_many(vec![new_job(TenantId::new(), UserId::new())])
            .await
            .unwrap()
            .remove(0);
        let at = Utc::now() + Duration::seconds(15);

        store.claim(job.id).await.unwrap();
        assert!(store.reschedule(job.id, at, "no active device").await.unwrap());

        let stored = store.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Pending);
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.scheduled_for, Some(at));
        assert_eq!(stored.last_error.as_deref(), Some("no active device"));
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let store = InMemoryQueueStore::new();
        let tenant = TenantId::new();
        let user = UserId::new();
        let now = Utc::now();

        let created = store
            .insert_many(vec![new_job(tenant, user), new_job(tenant, user), new_job(tenant, UserId::new())])
            .await
            .unwrap();
        let mut older = created[0].clone();
        older.created_at = now - Duration::minutes(5);
        store.put(older.clone());

        let inbox = store.list_for_user(tenant, user, 10).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[1].id, older.id);

        let limited = store.list_for_user(tenant, user, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, created[1].id);
    }
}
