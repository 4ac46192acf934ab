//! Shared fixtures for moodlens-ai integration tests
//!
//! Fake collaborators stand in for the Graph API and the vision service. Photo downloads
//! go to a real HTTP server bound to an ephemeral local port.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{extract::Path as UrlPath, http::StatusCode, routing::get, Router};
use moodlens_ai::models::{AlbumPhotoRef, RawAnnotation};
use moodlens_ai::services::{
    AlbumSource, AlbumSourceError, ImageStager, LocalObjectStore, ObjectStore, PhotoPipeline,
    StageError, VisionAnalyzer, VisionError,
};
use moodlens_ai::AppState;
use moodlens_common::ThematicConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const PUBLIC_BASE_URL: &str = "http://localhost:3001";
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg\xFF\xD9";

/// In-memory database with the photos schema
///
/// One connection only: every new connection to `:memory:` would be a separate database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    moodlens_ai::db::init_tables(&pool).await.unwrap();
    pool
}

/// Serves `/photos/{name}`; names starting with `missing` get a 404
pub async fn spawn_image_server() -> String {
    async fn photo(UrlPath(name): UrlPath<String>) -> Result<&'static [u8], StatusCode> {
        if name.starts_with("missing") {
            Err(StatusCode::NOT_FOUND)
        } else {
            Ok(JPEG_BYTES)
        }
    }

    let app = Router::new().route("/photos/:name", get(photo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

type AnnotateFn = dyn Fn(&str) -> Result<RawAnnotation, VisionError> + Send + Sync;

/// Vision fake driven by a closure over the durable image URL
pub struct FakeVision {
    respond: Box<AnnotateFn>,
    calls: Mutex<Vec<String>>,
}

impl FakeVision {
    pub fn new(
        respond: impl Fn(&str) -> Result<RawAnnotation, VisionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every image gets the same annotation
    pub fn always(annotation: RawAnnotation) -> Self {
        Self::new(move |_| Ok(annotation.clone()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionAnalyzer for FakeVision {
    async fn annotate(&self, image_url: &str) -> Result<RawAnnotation, VisionError> {
        self.calls.lock().unwrap().push(image_url.to_string());
        (self.respond)(image_url)
    }
}

/// Album source returning a fixed listing, or failing the whole batch
pub struct FakeAlbumSource {
    photos: Result<Vec<AlbumPhotoRef>, String>,
    tokens: Mutex<Vec<String>>,
}

impl FakeAlbumSource {
    pub fn with_photos(photos: Vec<AlbumPhotoRef>) -> Self {
        Self {
            photos: Ok(photos),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            photos: Err(message.to_string()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlbumSource for FakeAlbumSource {
    async fn list_photo_refs(
        &self,
        access_token: &str,
    ) -> Result<Vec<AlbumPhotoRef>, AlbumSourceError> {
        self.tokens.lock().unwrap().push(access_token.to_string());
        self.photos
            .clone()
            .map_err(AlbumSourceError::GraphError)
    }
}

/// Object store that refuses one destination and stores everything else locally
pub struct RejectingStore {
    rejected: String,
    inner: LocalObjectStore,
}

impl RejectingStore {
    pub fn new(rejected: &str, media_dir: PathBuf) -> Self {
        Self {
            rejected: rejected.to_string(),
            inner: LocalObjectStore::new(media_dir, PUBLIC_BASE_URL),
        }
    }
}

#[async_trait]
impl ObjectStore for RejectingStore {
    async fn upload(&self, local_file: &Path, destination: &str) -> Result<String, StageError> {
        if destination == self.rejected {
            return Err(StageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "bucket is read-only",
            )));
        }
        self.inner.upload(local_file, destination).await
    }
}

/// Make every insert into `photos` fail while reads keep working
pub async fn reject_photo_inserts(pool: &SqlitePool) {
    sqlx::query(
        r#"
        CREATE TRIGGER reject_photo_inserts BEFORE INSERT ON photos
        BEGIN
            SELECT RAISE(ABORT, 'database is full');
        END
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

/// Scratch root folder with `tmp/` and `media/`
pub struct TestDirs {
    _root: TempDir,
    pub temp_dir: PathBuf,
    pub media_dir: PathBuf,
}

impl TestDirs {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let temp_dir = root.path().join("tmp");
        let media_dir = root.path().join("media");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::create_dir_all(&media_dir).unwrap();
        Self {
            _root: root,
            temp_dir,
            media_dir,
        }
    }

    pub fn stager(&self) -> ImageStager {
        let store = Arc::new(LocalObjectStore::new(self.media_dir.clone(), PUBLIC_BASE_URL));
        ImageStager::new(self.temp_dir.clone(), store, Duration::from_secs(5)).unwrap()
    }

    pub fn pipeline(&self, pool: &SqlitePool, vision: Arc<FakeVision>) -> PhotoPipeline {
        PhotoPipeline::new(pool.clone(), self.stager(), vision, ThematicConfig::default())
    }

    /// Pipeline whose staging refuses `rejected_destination`
    pub fn pipeline_rejecting(
        &self,
        pool: &SqlitePool,
        vision: Arc<FakeVision>,
        rejected_destination: &str,
    ) -> PhotoPipeline {
        let store = Arc::new(RejectingStore::new(rejected_destination, self.media_dir.clone()));
        let stager = ImageStager::new(self.temp_dir.clone(), store, Duration::from_secs(5)).unwrap();
        PhotoPipeline::new(pool.clone(), stager, vision, ThematicConfig::default())
    }

    pub fn app_state(
        &self,
        pool: &SqlitePool,
        album_source: Arc<FakeAlbumSource>,
        vision: Arc<FakeVision>,
    ) -> AppState {
        let pipeline = Arc::new(self.pipeline(pool, vision));
        AppState::new(pool.clone(), album_source, pipeline).with_media_dir(self.media_dir.clone())
    }
}

/// Names of the files left in `dir`
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Album reference pointing at the local image server
pub fn photo_ref(image_base: &str, id: &str, file: &str) -> AlbumPhotoRef {
    AlbumPhotoRef::new(id, Some(format!("{}/photos/{}", image_base, file)))
}

pub fn annotation(labels: &[&str], objects: &[&str]) -> RawAnnotation {
    RawAnnotation {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        objects: objects.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}
