//! Image staging
//!
//! Downloads a photo to a transient local file, then copies it into durable object
//! storage. The transient file is owned by one pipeline run and removed when that run
//! ends, whether it succeeded or not.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempPath;
use thiserror::Error;

use super::object_store::ObjectStore;

const USER_AGENT: &str = concat!("moodlens/", env!("CARGO_PKG_VERSION"));

/// Staging errors
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Download failed with HTTP status {0}")]
    DownloadStatus(u16),

    #[error("Invalid storage destination: {0}")]
    InvalidDestination(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Locally downloaded photo bytes
///
/// Deleted when dropped; `release` deletes eagerly and logs a failed delete.
#[derive(Debug)]
pub struct TransientImage {
    path: TempPath,
}

impl TransientImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::error!(path = %path.display(), error = %e, "Failed to delete transient photo");
        }
    }
}

/// Keep ids usable as file names
fn file_stem(external_id: &str) -> String {
    let stem: String = external_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "photo".to_string()
    } else {
        stem
    }
}

/// Storage key of a staged photo
///
/// Ids that are already file-name safe are used as is. Any other id gets a digest of
/// the raw id appended after a `.`, which a safe id never contains, so distinct ids
/// never share a key.
pub fn destination_for(external_id: &str) -> String {
    let stem = file_stem(external_id);
    if stem == external_id {
        return format!("photos/{}.jpg", stem);
    }

    let digest = format!("{:x}", Sha256::digest(external_id.as_bytes()));
    format!("photos/{}.{}.jpg", stem, &digest[..16])
}

/// Downloads to `temp_dir` and uploads through an `ObjectStore`
pub struct ImageStager {
    http_client: reqwest::Client,
    temp_dir: PathBuf,
    store: Arc<dyn ObjectStore>,
}

impl ImageStager {
    /// `temp_dir` must already exist (see `moodlens_common::config::ensure_directory`)
    pub fn new(
        temp_dir: PathBuf,
        store: Arc<dyn ObjectStore>,
        timeout: Duration,
    ) -> Result<Self, StageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StageError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            temp_dir,
            store,
        })
    }

    /// Fetch `source_url` into a new transient file
    ///
    /// Nothing is left on disk when this fails.
    pub async fn download(
        &self,
        external_id: &str,
        source_url: &str,
    ) -> Result<TransientImage, StageError> {
        let response = self
            .http_client
            .get(source_url)
            .send()
            .await
            .map_err(|e| StageError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StageError::DownloadStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StageError::NetworkError(e.to_string()))?;

        // Unique name per run; concurrent batches may stage the same photo
        let path = tempfile::Builder::new()
            .prefix(&format!("{}-", file_stem(external_id)))
            .suffix(".jpg")
            .tempfile_in(&self.temp_dir)?
            .into_temp_path();
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(
            photo_id = %external_id,
            bytes = bytes.len(),
            path = %path.display(),
            "Downloaded photo to transient file"
        );

        Ok(TransientImage { path })
    }

    /// Copy a downloaded photo into durable storage and return its durable URL
    pub async fn upload(
        &self,
        external_id: &str,
        image: &TransientImage,
    ) -> Result<String, StageError> {
        self.store
            .upload(image.path(), &destination_for(external_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_uses_photo_id() {
        assert_eq!(destination_for("10158"), "photos/10158.jpg");
    }

    #[test]
    fn test_destination_keeps_safe_ids() {
        assert_eq!(destination_for("a_b-3"), "photos/a_b-3.jpg");
    }

    #[test]
    fn test_destination_sanitizes_path_characters() {
        let escaping = destination_for("../../etc");
        assert!(escaping.starts_with("photos/______etc."));
        assert!(escaping.ends_with(".jpg"));
        assert_eq!(escaping.matches('/').count(), 1);

        assert!(destination_for("").starts_with("photos/photo."));
    }

    #[test]
    fn test_sanitized_ids_do_not_collide() {
        let dotted = destination_for("a.b");
        let slashed = destination_for("a/b");
        let safe = destination_for("a_b");

        assert_eq!(safe, "photos/a_b.jpg");
        assert_ne!(dotted, safe);
        assert_ne!(slashed, safe);
        assert_ne!(dotted, slashed);
        // Stable across calls so a re-run stores to the same key
        assert_eq!(dotted, destination_for("a.b"));
    }

    #[test]
    fn test_release_deletes_transient_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = tempfile::Builder::new()
            .tempfile_in(dir.path())
            .unwrap()
            .into_temp_path();
        let file = path.to_path_buf();
        let image = TransientImage { path };

        assert!(file.exists());
        image.release();
        assert!(!file.exists());
    }

    #[test]
    fn test_drop_deletes_transient_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = tempfile::Builder::new()
            .tempfile_in(dir.path())
            .unwrap()
            .into_temp_path();
        let file = path.to_path_buf();

        drop(TransientImage { path });

        assert!(!file.exists());
    }
}
