//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: in-memory video repository, in-memory object
//! store, and fake media tools standing in for ffprobe/ffmpeg.

#![allow(dead_code)]

pub mod fakes;

use axum::body::Body;
use axum::extract::{FromRequest, Multipart};
use axum::http::{header::CONTENT_TYPE, Request};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::Utc;
use fakes::{FakeProber, FakeRepackager};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::JwtVerifier;
use tubely_api::setup::{routes, services};
use tubely_api::state::AppState;
use tubely_core::models::{
    AspectRatio, ProbeFailurePolicy, ThumbnailStrategy, Video, VideoUrlStrategy,
};
use tubely_core::{BaseConfig, Config, ServiceConfig, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::MemoryStorage;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BUCKET: &str = "tubely-test";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";

/// Knobs for a single test application
pub struct TestOptions {
    pub video_url_strategy: VideoUrlStrategy,
    pub thumbnail_strategy: ThumbnailStrategy,
    pub probe_failure_policy: ProbeFailurePolicy,
    /// `None` makes the prober fail
    pub probe_result: Option<AspectRatio>,
    /// Park every probe call until the request is dropped
    pub probe_holds: bool,
    pub repackage_fails: bool,
    pub max_thumbnail_size_bytes: usize,
    pub storage_put_max_retries: u32,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            video_url_strategy: VideoUrlStrategy::Presigned {
                ttl: Duration::from_secs(600),
            },
            thumbnail_strategy: ThumbnailStrategy::Registry,
            probe_failure_policy: ProbeFailurePolicy::Lenient,
            probe_result: Some(AspectRatio::Landscape),
            probe_holds: false,
            repackage_fails: false,
            max_thumbnail_size_bytes: 10 * 1024 * 1024,
            storage_put_max_retries: 2,
        }
    }
}

/// Test application: server plus handles on every in-memory collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub videos: Arc<InMemoryVideoRepository>,
    pub storage: Arc<MemoryStorage>,
    pub prober: Arc<FakeProber>,
    pub repackager: Arc<FakeRepackager>,
    pub verifier: JwtVerifier,
    pub temp_root: TempDir,
    pub assets_root: TempDir,
}

impl TestApp {
    /// Seed a video record owned by `owner`
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Boot.dev beats".to_string(),
            description: "lofi".to_string(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.insert(video.clone()).await;
        video
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.videos
            .get_video(id)
            .await
            .expect("repository read")
            .expect("video exists")
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.verifier
            .issue(user_id, chrono::Duration::hours(1))
            .expect("sign token")
    }

    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }

    /// Per-request scratch directories still present under the temp root
    pub fn leftover_scratch_dirs(&self) -> usize {
        count_entries(self.temp_root.path())
    }
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

pub fn test_config(options: &TestOptions, temp_root: &Path, assets_root: &Path) -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_issuer: "tubely-access".to_string(),
            log_format: "text".to_string(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
        database_url: None,
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_backend: StorageBackend::Memory,
        bucket: TEST_BUCKET.to_string(),
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        storage_put_max_retries: options.storage_put_max_retries,
        storage_put_retry_base_ms: 1,
        video_url_strategy: options.video_url_strategy.clone(),
        thumbnail_strategy: options.thumbnail_strategy,
        assets_root: assets_root.to_string_lossy().into_owned(),
        max_video_size_bytes: 64 * 1024 * 1024,
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        media_tool_timeout_secs: 5,
        probe_failure_policy: options.probe_failure_policy,
        upload_temp_dir: Some(temp_root.to_string_lossy().into_owned()),
    }))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_root = tempfile::tempdir().expect("Failed to create temp root");
    let assets_root = tempfile::tempdir().expect("Failed to create assets root");
    let config = test_config(&options, temp_root.path(), assets_root.path());

    let videos = Arc::new(InMemoryVideoRepository::new());
    let storage = Arc::new(MemoryStorage::new(TEST_BUCKET));
    let prober = Arc::new(if options.probe_holds {
        FakeProber::holding()
    } else {
        FakeProber::new(options.probe_result)
    });
    let repackager = Arc::new(FakeRepackager::new(options.repackage_fails));
    let verifier = JwtVerifier::new(TEST_JWT_SECRET, "tubely-access");

    let state = services::build_state(
        config,
        videos.clone(),
        storage.clone(),
        prober.clone(),
        repackager.clone(),
        Arc::new(JwtVerifier::new(TEST_JWT_SECRET, "tubely-access")),
    );
    let app = routes::build_router(state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        state,
        videos,
        storage,
        prober,
        repackager,
        verifier,
        temp_root,
        assets_root,
    }
}

/// A multipart form with one file part
pub fn file_form(field: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}

pub fn video_form(size: usize) -> MultipartForm {
    file_form("video", fake_mp4(size), "clip.mp4", "video/mp4")
}

/// Bytes that start like an MP4 `ftyp` box; content is never decoded in tests
pub fn fake_mp4(size: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(size.max(data.len()), 0xAB);
    data
}

pub fn fake_png(size: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(size.max(data.len()), 0x42);
    data
}

/// A `Multipart` extractor over a single file part, for driving services
/// without going through the router
pub async fn multipart_extractor(
    field: &str,
    data: &[u8],
    file_name: &str,
    mime_type: &str,
) -> Multipart {
    let boundary = "tubely-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .expect("build multipart request");
    Multipart::from_request(request, &())
        .await
        .expect("multipart extractor")
}
