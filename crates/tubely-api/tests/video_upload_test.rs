//! Video upload API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test video_upload_test`

mod helpers;

use helpers::{
    fake_mp4, file_form, multipart_extractor, setup_test_app, setup_test_app_with, video_form,
    TestOptions, TEST_BUCKET,
};
use std::future::IntoFuture;
use tubely_core::models::{AspectRatio, ProbeFailurePolicy, VideoUrlStrategy};
use uuid::Uuid;

fn upload_path(id: impl std::fmt::Display) -> String {
    format!("/api/video_upload/{}", id)
}

#[tokio::test]
async fn test_upload_landscape_video() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(2 * 1024 * 1024))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let url = body["video_url"].as_str().expect("video_url in response");
    assert!(url.contains("landscape/"), "unexpected url {url}");
    assert!(url.contains("expires_in=600"));

    let puts = app.storage.put_calls().await;
    assert_eq!(puts.len(), 1);
    assert!(puts[0].key.starts_with("landscape/"));
    assert_eq!(puts[0].content_type, "video/mp4");
    assert_eq!(puts[0].size, 2 * 1024 * 1024);

    // The record keeps the raw locator, not the signed URL
    let stored = app.stored_video(video.id).await;
    assert_eq!(
        stored.video_url.as_deref(),
        Some(format!("{},{}", TEST_BUCKET, puts[0].key).as_str())
    );
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_portrait_video_key_prefix() {
    let app = setup_test_app_with(TestOptions {
        probe_result: Some(AspectRatio::Portrait),
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 200);
    let puts = app.storage.put_calls().await;
    assert!(puts[0].key.starts_with("portrait/"));
}

#[tokio::test]
async fn test_lenient_probe_failure_classifies_as_other() {
    let app = setup_test_app_with(TestOptions {
        probe_result: None,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 200);
    let puts = app.storage.put_calls().await;
    assert_eq!(puts.len(), 1);
    assert!(puts[0].key.starts_with("other/"));
}

#[tokio::test]
async fn test_strict_probe_failure_aborts_upload() {
    let app = setup_test_app_with(TestOptions {
        probe_result: None,
        probe_failure_policy: ProbeFailurePolicy::Strict,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "IO_ERROR");
    assert_eq!(app.repackager.calls(), 0);
    assert!(app.storage.put_calls().await.is_empty());
    assert_eq!(app.videos.update_count(), 0);
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_repackage_failure_is_io_error_and_cleans_up() {
    let app = setup_test_app_with(TestOptions {
        repackage_fails: true,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "IO_ERROR");
    // ffmpeg stderr stays out of the response
    assert!(!body.to_string().contains("Invalid data found"));
    assert_eq!(app.storage.put_attempts(), 0);
    assert_eq!(app.videos.update_count(), 0);
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_unsupported_video_type_has_no_side_effects() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(file_form(
            "video",
            helpers::fake_mp4(4096),
            "clip.mov",
            "video/quicktime",
        ))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["error"].as_str().unwrap().contains("video/quicktime"));
    assert_eq!(app.leftover_scratch_dirs(), 0);
    assert_eq!(app.prober.calls(), 0);
    assert_eq!(app.storage.put_attempts(), 0);
    assert_eq!(app.videos.update_count(), 0);
}

#[tokio::test]
async fn test_missing_video_field() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(file_form("file", helpers::fake_mp4(128), "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = setup_test_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;

    let response = app
        .server
        .post(&upload_path(video.id))
        .multipart(video_form(128))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", "Bearer not-a-jwt")
        .multipart(video_form(128))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(app.videos.update_count(), 0);
}

#[tokio::test]
async fn test_upload_by_non_owner_is_forbidden() {
    let app = setup_test_app().await;
    let video = app.seed_video(Uuid::new_v4()).await;
    let intruder = Uuid::new_v4();

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(intruder))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(app.stored_video(video.id).await, video);
    assert_eq!(app.storage.put_attempts(), 0);
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_upload_for_missing_video_is_not_found() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    let response = app
        .server
        .post(&upload_path(Uuid::new_v4()))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_invalid_video_id() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    let response = app
        .server
        .post(&upload_path("not-a-uuid"))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(128))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn test_transient_storage_failure_is_retried() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    app.storage.fail_next_puts(1);

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.storage.put_attempts(), 2);
    assert_eq!(app.storage.put_calls().await.len(), 1);
}

#[tokio::test]
async fn test_storage_failure_after_retries_is_storage_error() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    app.storage.fail_next_puts(10);

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(body["error"], "Failed to access storage");
    // first attempt plus two retries
    assert_eq!(app.storage.put_attempts(), 3);
    assert_eq!(app.videos.update_count(), 0);
    assert_eq!(app.stored_video(video.id).await.video_url, None);
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_persistence_failure_removes_stored_object() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    app.videos.fail_next_updates(1);

    let response = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
    assert_eq!(body["error"], "Failed to update video");

    // The put went through, then was rolled back
    let puts = app.storage.put_calls().await;
    assert_eq!(puts.len(), 1);
    assert!(app.storage.object(&puts[0].key).await.is_none());
    assert_eq!(app.stored_video(video.id).await.video_url, None);
    assert_eq!(app.leftover_scratch_dirs(), 0);
}

#[tokio::test]
async fn test_cancelled_upload_removes_scratch_dir() {
    let app = setup_test_app_with(TestOptions {
        probe_holds: true,
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let multipart = multipart_extractor("video", &fake_mp4(4096), "clip.mp4", "video/mp4").await;

    let state = app.state.clone();
    let upload = tokio::spawn(async move {
        state
            .video_uploads
            .upload(video.id, owner, multipart)
            .await
    });

    // Parked inside the probe with the upload on disk
    app.prober.entered().await;
    assert_eq!(app.leftover_scratch_dirs(), 1);

    // Same as the client going away: the request future is dropped
    upload.abort();
    assert!(upload.await.unwrap_err().is_cancelled());

    assert_eq!(app.leftover_scratch_dirs(), 0);
    assert_eq!(app.repackager.calls(), 0);
    assert!(app.storage.put_calls().await.is_empty());
    assert_eq!(app.videos.update_count(), 0);
}

#[tokio::test]
async fn test_get_video_resolves_cdn_url() {
    let app = setup_test_app_with(TestOptions {
        video_url_strategy: VideoUrlStrategy::StaticUrl {
            base_url: Some("https://cdn.example.com".to_string()),
        },
        ..Default::default()
    })
    .await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let upload = app
        .server
        .post(&upload_path(video.id))
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(4096))
        .await;
    assert_eq!(upload.status_code(), 200);

    let key = app.storage.put_calls().await[0].key.clone();
    let response = app
        .server
        .get(&format!("/api/videos/{}", video.id))
        .add_header("Authorization", app.bearer(owner))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["video_url"],
        format!("https://cdn.example.com/{}", key)
    );
}

#[tokio::test]
async fn test_get_video_without_upload_has_no_url() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;

    let response = app
        .server
        .get(&format!("/api/videos/{}", video.id))
        .add_header("Authorization", app.bearer(owner))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["video_url"].is_null());
}

#[tokio::test]
async fn test_concurrent_uploads_last_write_wins() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.seed_video(owner).await;
    let path = upload_path(video.id);

    let first = app
        .server
        .post(&path)
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(64 * 1024));
    let second = app
        .server
        .post(&path)
        .add_header("Authorization", app.bearer(owner))
        .multipart(video_form(32 * 1024));

    let (first, second) = tokio::join!(first.into_future(), second.into_future());
    assert_eq!(first.status_code(), 200);
    assert_eq!(second.status_code(), 200);

    let puts = app.storage.put_calls().await;
    assert_eq!(puts.len(), 2);
    assert_ne!(puts[0].key, puts[1].key);
    assert_eq!(app.videos.update_count(), 2);

    // Whichever persisted last owns the record; both objects remain stored
    let stored = app.stored_video(video.id).await;
    let locator = stored.video_url.expect("locator persisted");
    assert!(puts
        .iter()
        .any(|p| locator == format!("{},{}", TEST_BUCKET, p.key)));
    assert_eq!(app.leftover_scratch_dirs(), 0);
}
