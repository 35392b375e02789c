//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p tubely-api`. Records are kept in
//! memory, thumbnails go to a temp dir, videos to an in-memory object store.

pub mod auth;
pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use object_store::memory::InMemory;
use tempfile::TempDir;
use tubely_api::auth::JwtVerifier;
use tubely_api::pipeline::{AssetTarget, UploadPipeline};
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::{
    AssetClass, BaseConfig, Config, Record, StorageBackend, UploadServiceConfig,
    THUMBNAIL_MAX_BYTES, VIDEO_MAX_BYTES,
};
use tubely_db::{InMemoryRecordRepository, RecordRepository};
use tubely_storage::{KeyGenerator, LocalStorage, S3Storage, Storage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_JWT_ISSUER: &str = "tubely-access";
pub const TEST_BUCKET: &str = "tubely-test-videos";
pub const TEST_REGION: &str = "us-east-2";

/// Test application: server and the backing stores it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub records: Arc<InMemoryRecordRepository>,
    pub video_store: Arc<InMemory>,
    pub verifier: JwtVerifier,
    pub assets_dir: TempDir,
    pub _spool_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Create a record owned by `owner`.
    pub async fn create_record(&self, owner: Uuid) -> Record {
        self.records
            .create_record(&Record::new(owner, "Boots", "A video about boots"))
            .await
            .expect("Failed to create record")
    }

    pub async fn get_record(&self, id: Uuid) -> Record {
        self.records
            .get_record(id)
            .await
            .expect("Failed to load record")
            .expect("Record missing")
    }

    /// Files currently under the local assets root.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.assets_dir.path())
            .expect("Failed to read assets dir")
            .map(|entry| entry.expect("Failed to read dir entry").path())
            .collect()
    }
}

pub fn create_test_config(assets_root: PathBuf, spool_dir: PathBuf) -> Config {
    Config(Box::new(UploadServiceConfig {
        base: BaseConfig {
            server_port: 8091,
            public_host: "localhost".to_string(),
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_issuer: TEST_JWT_ISSUER.to_string(),
            environment: "test".to_string(),
        },
        database_url: None,
        thumbnail_storage_backend: StorageBackend::Local,
        video_storage_backend: StorageBackend::S3,
        assets_root,
        assets_url_prefix: "assets".to_string(),
        s3_bucket: Some(TEST_BUCKET.to_string()),
        s3_region: Some(TEST_REGION.to_string()),
        s3_endpoint: None,
        aws_region: None,
        upload_spool_dir: Some(spool_dir),
        thumbnail_max_bytes: THUMBNAIL_MAX_BYTES,
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        video_max_bytes: VIDEO_MAX_BYTES,
        video_allowed_content_types: vec!["video/mp4".to_string()],
    }))
}

/// Setup test app with in-memory records, local thumbnails and in-memory S3.
pub async fn setup_test_app() -> TestApp {
    let assets_dir = tempfile::tempdir().expect("Failed to create assets directory");
    let spool_dir = tempfile::tempdir().expect("Failed to create spool directory");
    let config = create_test_config(
        assets_dir.path().to_path_buf(),
        spool_dir.path().to_path_buf(),
    );
    config.validate().expect("Test config should be valid");

    let thumbnail_storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.assets_root().to_path_buf(), config.local_base_url())
            .await
            .expect("Failed to create local storage"),
    );
    let video_store = Arc::new(InMemory::new());
    let video_storage: Arc<dyn Storage> = Arc::new(S3Storage::with_store(
        video_store.clone(),
        TEST_BUCKET.to_string(),
        TEST_REGION.to_string(),
        None,
        Some(spool_dir.path().to_path_buf()),
    ));

    let records = Arc::new(InMemoryRecordRepository::new());
    let pipeline = UploadPipeline::new(
        Arc::new(JwtVerifier::new(TEST_JWT_SECRET, TEST_JWT_ISSUER)),
        records.clone(),
        KeyGenerator::new(),
        AssetTarget {
            policy: config.asset_policy(AssetClass::Thumbnail),
            storage: thumbnail_storage,
        },
        AssetTarget {
            policy: config.asset_policy(AssetClass::Video),
            storage: video_storage,
        },
    );

    let state = Arc::new(AppState {
        config,
        pipeline: Arc::new(pipeline),
    });
    let app = routes::setup_routes(state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        records,
        video_store,
        verifier: JwtVerifier::new(TEST_JWT_SECRET, TEST_JWT_ISSUER),
        assets_dir,
        _spool_dir: spool_dir,
    }
}
