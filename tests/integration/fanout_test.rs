//! Fan-out scenarios: recipient resolution, dedup and settings gates.

use campusbell_core::events::{
    AnnouncementCreated, AudienceTag, DiaryUpdated, DomainEvent, EventPayload, GalleryPostCreated,
    NewMessage,
};
use campusbell_core::types::{AnnouncementId, ClassId, MessageId, PostId, StudentId, UserId};
use campusbell_entity::job::NotificationData;
use campusbell_entity::settings::NotificationSettings;
use chrono::NaiveDate;

use crate::helpers::TestApp;

fn diary(app: &TestApp, student: StudentId) -> DiaryUpdated {
    DiaryUpdated {
        tenant_id: app.tenant,
        student_id: student,
        student_name: "Noah".into(),
        date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
    }
}

#[tokio::test]
async fn test_diary_and_overlapping_announcement_dedup() {
    let app = TestApp::new();
    let (class_a, class_b) = (ClassId::new(), ClassId::new());
    let student = StudentId::new();
    let sibling = StudentId::new();
    let (a, b) = (UserId::new(), UserId::new());
    app.directory.add_student(app.tenant, student, Some(class_a));
    app.directory.add_student(app.tenant, sibling, Some(class_b));
    app.directory.add_guardian(app.tenant, student, a);
    app.directory.add_guardian(app.tenant, student, b);
    app.directory.add_guardian(app.tenant, sibling, a);

    assert_eq!(app.pipeline.triggers.on_diary_updated(&diary(&app, student)).await, 2);

    let written = app
        .pipeline
        .triggers
        .on_announcement_created(&AnnouncementCreated {
            tenant_id: app.tenant,
            announcement_id: AnnouncementId::new(),
            title: "Concert".into(),
            content: "Spring concert rehearsal".into(),
            target_audience: vec![AudienceTag::Guardians, AudienceTag::Guardians],
            class_ids: Some(vec![class_a, class_b]),
            image_url: None,
        })
        .await;
    assert_eq!(written, 2);

    let announcement_jobs_for_a = app
        .jobs()
        .into_iter()
        .filter(|j| j.user_id == a && matches!(j.data, NotificationData::Announcement { .. }))
        .count();
    assert_eq!(announcement_jobs_for_a, 1);
}

#[tokio::test]
async fn test_zero_guardians_is_silent_noop() {
    let app = TestApp::new();
    let student = StudentId::new();
    app.directory.add_student(app.tenant, student, None);

    let event = DomainEvent::new(EventPayload::DiaryUpdated(diary(&app, student)));
    assert_eq!(app.pipeline.triggers.handle(&event).await, 0);
    assert!(app.jobs().is_empty());
}

#[tokio::test]
async fn test_role_audience_and_guardians_merge() {
    let app = TestApp::new();
    let (_, guardian) = app.student_with_guardian(None);
    let teacher = UserId::new();
    app.directory.add_user(app.tenant, teacher, "teacher");
    app.directory.add_user(app.tenant, guardian, "teacher");

    let written = app
        .pipeline
        .triggers
        .on_announcement_created(&AnnouncementCreated {
            tenant_id: app.tenant,
            announcement_id: AnnouncementId::new(),
            title: "Staff and parents".into(),
            content: "Open day".into(),
            target_audience: vec![AudienceTag::Guardians, AudienceTag::from("teacher")],
            class_ids: None,
            image_url: None,
        })
        .await;

    assert_eq!(written, 2);
}

#[tokio::test]
async fn test_each_kind_respects_its_flag() {
    let app = TestApp::new();
    let class = ClassId::new();
    let (student, guardian) = app.student_with_guardian(Some(class));
    app.pipeline
        .settings
        .update(NotificationSettings {
            gallery_enabled: false,
            message_enabled: false,
            ..NotificationSettings::defaults_for(app.tenant)
        })
        .await
        .unwrap();

    let gallery = app
        .pipeline
        .triggers
        .on_gallery_post_created(&GalleryPostCreated {
            tenant_id: app.tenant,
            post_id: PostId::new(),
            class_id: class,
            class_name: "Reception".into(),
            caption: Some("Pumpkin carving".into()),
            image_url: None,
        })
        .await;
    let message = app
        .pipeline
        .triggers
        .on_new_message(&NewMessage {
            tenant_id: app.tenant,
            message_id: MessageId::new(),
            sender_id: UserId::new(),
            sender_name: "Office".into(),
            recipient_id: guardian,
            content: "Hello".into(),
        })
        .await;
    let diary_written = app.pipeline.triggers.on_diary_updated(&diary(&app, student)).await;

    assert_eq!((gallery, message, diary_written), (0, 0, 1));
}

#[tokio::test]
async fn test_lookup_failure_never_reaches_caller() {
    let app = TestApp::new();
    app.student_with_guardian(None);
    app.directory.fail_lookups(true);

    let written = app
        .pipeline
        .triggers
        .on_announcement_created(&AnnouncementCreated {
            tenant_id: app.tenant,
            announcement_id: AnnouncementId::new(),
            title: "Closure".into(),
            content: "Closed tomorrow".into(),
            target_audience: vec![AudienceTag::Guardians],
            class_ids: None,
            image_url: None,
        })
        .await;

    assert_eq!(written, 0);
    assert!(app.jobs().is_empty());
}
