//! Dispatch scenarios: claim, retry, failure and delivery.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use campusbell_core::config::WorkerConfig;
use campusbell_core::events::{AnnouncementCreated, AudienceTag, DiaryUpdated};
use campusbell_core::types::{AnnouncementId, UserId};
use campusbell_entity::job::{NotificationPriority, NotificationStatus};
use campusbell_push::PushAdapter;
use campusbell_worker::{DispatchQueue, Dispatcher};

use crate::helpers::{LockstepScans, TestApp};

fn announcement(app: &TestApp) -> AnnouncementCreated {
    AnnouncementCreated {
        tenant_id: app.tenant,
        announcement_id: AnnouncementId::new(),
        title: "Sports day".into(),
        content: "Sports day is on Friday, bring a water bottle.".into(),
        target_audience: vec![AudienceTag::Guardians],
        class_ids: None,
        image_url: None,
    }
}

#[tokio::test]
async fn test_announcement_delivered_end_to_end() {
    let app = TestApp::new();
    let mut guardians = BTreeSet::new();
    for n in 0..3 {
        let (_, guardian) = app.student_with_guardian(None);
        app.register_device(guardian, &format!("phone-{n}")).await;
        guardians.insert(guardian);
    }

    let written = app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;
    assert_eq!(written, 3);

    let jobs = app.jobs();
    let batches: BTreeSet<_> = jobs.iter().map(|j| j.batch_id).collect();
    assert_eq!(batches.len(), 1);
    assert!(batches.iter().all(Option::is_some));
    assert!(jobs.iter().all(|j| j.priority == NotificationPriority::High));
    assert_eq!(jobs.iter().map(|j| j.user_id).collect::<BTreeSet<_>>(), guardians);

    let summary = app.pipeline.dispatcher.tick().await;
    assert_eq!(summary.claimed, 3);
    assert_eq!(summary.sent, 3);

    for job in app.jobs() {
        assert_eq!(job.status, NotificationStatus::Sent);
        assert!(job.sent_at.is_some());
        assert_eq!(job.attempts, 1);
    }
    assert_eq!(app.provider.sent_messages().len(), 3);
}

#[tokio::test]
async fn test_last_attempt_without_device_fails() {
    let app = TestApp::new();
    let (student, guardian) = app.student_with_guardian(None);
    app.pipeline
        .triggers
        .on_diary_updated(&DiaryUpdated {
            tenant_id: app.tenant,
            student_id: student,
            student_name: "Ava".into(),
            date: Utc::now().date_naive(),
        })
        .await;

    let mut job = app.jobs().remove(0);
    job.attempts = 2;
    app.queue.put(job.clone());

    let summary = app.pipeline.dispatcher.tick().await;
    assert_eq!(summary.failed, 1);

    let inbox = app.pipeline.inbox.inbox(app.tenant, guardian, None).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].status, NotificationStatus::Failed);
    assert_eq!(inbox[0].attempts, 3);
    assert!(inbox[0].scheduled_for.is_none());
    assert_eq!(inbox[0].last_error.as_deref(), Some("no active device tokens"));
}

#[tokio::test]
async fn test_device_registered_after_enqueue_gets_retry() {
    let app = TestApp::new();
    let (_, guardian) = app.student_with_guardian(None);
    app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;

    let first = app.pipeline.dispatcher.tick().await;
    assert_eq!(first.retried, 1);

    app.register_device(guardian, "late-phone").await;
    app.make_all_due();

    let second = app.pipeline.dispatcher.tick().await;
    assert_eq!(second.sent, 1);
    let job = app.jobs().remove(0);
    assert_eq!(job.status, NotificationStatus::Sent);
    assert_eq!(job.attempts, 2);
}

#[tokio::test]
async fn test_provider_outage_exhausts_attempts() {
    let app = TestApp::new();
    let (_, guardian) = app.student_with_guardian(None);
    app.register_device(guardian, "phone").await;
    app.provider.fail_next(usize::MAX);
    app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;

    let mut transitions = 0;
    for _ in 0..6 {
        transitions += app.pipeline.dispatcher.tick().await.claimed;
        app.make_all_due();
    }

    let job = app.jobs().remove(0);
    assert_eq!(transitions, 3);
    assert_eq!(job.status, NotificationStatus::Failed);
    assert_eq!(job.attempts, job.max_attempts);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatchers_send_each_job_once() {
    let worker = WorkerConfig {
        batch_size: 50,
        ..WorkerConfig::default()
    };
    let app = TestApp::with_worker(worker.clone());
    for n in 0..20 {
        let (_, guardian) = app.student_with_guardian(None);
        app.register_device(guardian, &format!("device-{n}")).await;
    }
    app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;

    let lockstep = Arc::new(LockstepScans::new(app.stores.queue.clone(), 2));
    let dispatcher = || {
        Arc::new(Dispatcher::new(
            DispatchQueue::new(lockstep.clone()),
            app.stores.devices.clone(),
            PushAdapter::new(app.provider.clone(), None),
            &worker,
        ))
    };
    let (first, second) = (dispatcher(), dispatcher());

    let (a, b) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(
            tokio::spawn(async move { first.tick().await }),
            tokio::spawn(async move { second.tick().await }),
        )
    })
    .await
    .expect("both ticks should finish");
    let (a, b) = (a.unwrap(), b.unwrap());

    let scans = lockstep.scans();
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].len(), 20);
    assert_eq!(scans[0], scans[1]);
    assert_eq!((a.scanned, b.scanned), (20, 20));

    assert_eq!(a.claimed + b.claimed, 20);
    assert_eq!(a.sent + b.sent, 20);
    let recipients: Vec<String> = app.provider.sent_messages().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients.len(), 20);
    assert_eq!(recipients.iter().collect::<BTreeSet<_>>().len(), 20);
    for job in app.jobs() {
        assert_eq!(job.status, NotificationStatus::Sent);
        assert_eq!(job.attempts, 1);
    }
}

#[tokio::test]
async fn test_enqueue_wakes_running_worker() {
    let app = TestApp::with_worker(WorkerConfig {
        poll_interval_ms: 60_000,
        ..WorkerConfig::default()
    });
    let (_, guardian) = app.student_with_guardian(None);
    app.register_device(guardian, "phone").await;

    let runner = app.pipeline.runner();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while app.jobs().iter().any(|j| j.status != NotificationStatus::Sent) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("woken worker should deliver before the next interval");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner should stop")
        .unwrap();
}

#[tokio::test]
async fn test_sent_jobs_are_not_touched_again() {
    let app = TestApp::new();
    let (_, guardian) = app.student_with_guardian(None);
    app.register_device(guardian, "phone").await;
    app.pipeline.triggers.on_announcement_created(&announcement(&app)).await;
    app.pipeline.dispatcher.tick().await;
    let before = app.jobs();

    for _ in 0..3 {
        app.pipeline.dispatcher.tick().await;
    }

    assert_eq!(app.jobs(), before);
    assert_eq!(app.provider.sent_messages().len(), 1);
    assert!(app.pipeline.inbox.inbox(app.tenant, UserId::new(), None).await.unwrap().is_empty());
}
