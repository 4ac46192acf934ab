//! Durable object storage for staged photos
//!
//! The pipeline only needs "put this local file at this key, give me a URL the vision
//! service can fetch". `LocalObjectStore` keeps objects under the root folder and the
//! HTTP server exposes them at `/media/...`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::image_stager::StageError;

/// Durable storage seam
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy `local_file` to `destination` and return its durable URL
    async fn upload(&self, local_file: &Path, destination: &str) -> Result<String, StageError>;
}

/// Filesystem-backed object store served by this process
pub struct LocalObjectStore {
    media_dir: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Objects are written below `media_dir` and addressed as
    /// `{public_base_url}/media/{destination}`
    pub fn new(media_dir: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            media_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, destination: &str) -> Result<PathBuf, StageError> {
        let relative = Path::new(destination);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if destination.is_empty() || !is_plain {
            return Err(StageError::InvalidDestination(destination.to_string()));
        }
        Ok(self.media_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, local_file: &Path, destination: &str) -> Result<String, StageError> {
        let target = self.object_path(destination)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = tokio::fs::copy(local_file, &target).await?;

        tracing::debug!(
            destination = %destination,
            bytes,
            "Stored photo in local object store"
        );

        Ok(format!("{}/media/{}", self.public_base_url, destination))
    }
}
