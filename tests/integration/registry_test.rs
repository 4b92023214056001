//! Device registry scenarios.

use campusbell_core::error::ErrorKind;
use campusbell_core::types::UserId;
use campusbell_database::DeviceTokenStore;
use campusbell_entity::device::{DevicePlatform, RegisterDevice};

use crate::helpers::TestApp;

fn request(token: &str) -> RegisterDevice {
    RegisterDevice {
        device_id: "family-ipad".into(),
        token: token.into(),
        platform: DevicePlatform::Ios,
        device_name: Some("Family iPad".into()),
    }
}

#[tokio::test]
async fn test_reregistration_keeps_single_active_row() {
    let app = TestApp::new();
    let user = UserId::new();

    app.pipeline
        .devices
        .register(app.tenant, user, request("ExponentPushToken[first]"))
        .await
        .unwrap();
    app.pipeline
        .devices
        .register(app.tenant, user, request("ExponentPushToken[second]"))
        .await
        .unwrap();

    let devices = app.pipeline.devices.list(app.tenant, user).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].token, "ExponentPushToken[second]");
    assert!(devices[0].is_active);
}

#[tokio::test]
async fn test_unregister_soft_disables() {
    let app = TestApp::new();
    let user = UserId::new();
    app.register_device(user, "phone").await;

    app.pipeline.devices.unregister(app.tenant, user, "phone").await.unwrap();

    assert_eq!(app.devices.len(), 1);
    assert!(app.devices.find_active(app.tenant, user).await.unwrap().is_empty());
    let err = app
        .pipeline
        .devices
        .unregister(app.tenant, user, "missing")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_token_format_is_filtered_at_send() {
    let app = TestApp::new();
    let (_, guardian) = app.student_with_guardian(None);
    app.pipeline
        .devices
        .register(app.tenant, guardian, request("apns:0f3c"))
        .await
        .unwrap();
    app.pipeline
        .triggers
        .on_announcement_created(&campusbell_core::events::AnnouncementCreated {
            tenant_id: app.tenant,
            announcement_id: campusbell_core::types::AnnouncementId::new(),
            title: "Notice".into(),
            content: "Uniform check".into(),
            target_audience: vec![campusbell_core::events::AudienceTag::Guardians],
            class_ids: None,
            image_url: None,
        })
        .await;

    let summary = app.pipeline.dispatcher.tick().await;

    assert_eq!(summary.sent, 1);
    assert!(app.provider.chunks().is_empty());
}
