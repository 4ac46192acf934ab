//! moodlens-ai library interface
//!
//! Exposes the router and services for the binary and for integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::{AlbumSource, PhotoPipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Photo record store
    pub db: SqlitePool,
    /// Social-network album listing
    pub album_source: Arc<dyn AlbumSource>,
    /// Per-photo analysis pipeline
    pub pipeline: Arc<PhotoPipeline>,
    /// Local object store directory served at `/media`, if any
    pub media_dir: Option<PathBuf>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last batch-level error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        album_source: Arc<dyn AlbumSource>,
        pipeline: Arc<PhotoPipeline>,
    ) -> Self {
        Self {
            db,
            album_source,
            pipeline,
            media_dir: None,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_media_dir(mut self, media_dir: PathBuf) -> Self {
        self.media_dir = Some(media_dir);
        self
    }

    pub async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }

    /// Called once the album source answers again
    pub async fn clear_error(&self) {
        *self.last_error.write().await = None;
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(api::photo_routes())
        .merge(api::health_routes());

    // Durable photo URLs point here when the local object store is in use
    if let Some(media_dir) = &state.media_dir {
        router = router.nest_service("/media", ServeDir::new(media_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
