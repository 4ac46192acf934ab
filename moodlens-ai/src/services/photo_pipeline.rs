//! Per-photo analysis pipeline
//!
//! Each photo runs through a strictly sequential pipeline:
//! Validate → Dedup → Download → Stage → Annotate → Categorize → Persist
//!
//! # Failure isolation
//! Every step short-circuits to a `Dropped` outcome for that photo only. A batch never
//! fails because one of its photos did; dropped photos are logged and left out of the
//! result. Nothing is retried.
//!
//! # Concurrency
//! Photos of one batch run concurrently, at most `max_concurrent_photos` at a time,
//! via `buffer_unordered`. Result order follows completion, not album order.

use futures::stream::{self, StreamExt};
use moodlens_common::{PhotoRecord, ThematicConfig};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

use super::categorizer::categorize;
use super::dedup_filter::DedupFilter;
use super::image_stager::{ImageStager, StageError, TransientImage};
use super::vision_client::{VisionAnalyzer, VisionError};
use crate::models::AlbumPhotoRef;

pub const DEFAULT_MAX_CONCURRENT_PHOTOS: usize = 8;

/// Why a photo produced no record
#[derive(Debug, Error)]
pub enum Dropped {
    #[error("no usable image URL")]
    MissingSourceUrl,

    #[error("already analyzed")]
    Duplicate,

    #[error("download failed: {0}")]
    Download(#[source] StageError),

    #[error("staging failed: {0}")]
    Stage(#[source] StageError),

    #[error("annotation failed: {0}")]
    Annotation(#[from] VisionError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] moodlens_common::Error),
}

impl Dropped {
    /// Skips (no URL, duplicate) are expected; everything else is a failure
    pub fn is_failure(&self) -> bool {
        !matches!(self, Dropped::MissingSourceUrl | Dropped::Duplicate)
    }
}

/// Outcome of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully analyzed and persisted records, in completion order
    pub records: Vec<PhotoRecord>,
    /// Photos without a URL or already analyzed
    pub skipped: usize,
    /// Photos dropped by a failing step
    pub failed: usize,
}

/// Drives photos through dedup, staging, annotation, categorization and persistence
pub struct PhotoPipeline {
    db: SqlitePool,
    dedup: DedupFilter,
    stager: ImageStager,
    vision: Arc<dyn VisionAnalyzer>,
    thematic: ThematicConfig,
    max_concurrent_photos: usize,
}

impl PhotoPipeline {
    pub fn new(
        db: SqlitePool,
        stager: ImageStager,
        vision: Arc<dyn VisionAnalyzer>,
        thematic: ThematicConfig,
    ) -> Self {
        Self {
            dedup: DedupFilter::new(db.clone()),
            db,
            stager,
            vision,
            thematic,
            max_concurrent_photos: DEFAULT_MAX_CONCURRENT_PHOTOS,
        }
    }

    /// Bound on photos in flight per batch (at least 1)
    pub fn with_max_concurrent_photos(mut self, max_concurrent_photos: usize) -> Self {
        self.max_concurrent_photos = max_concurrent_photos.max(1);
        self
    }

    pub fn max_concurrent_photos(&self) -> usize {
        self.max_concurrent_photos
    }

    /// Run one photo through the whole pipeline
    ///
    /// The transient download is released before returning on every path.
    pub async fn process_photo(
        &self,
        user_id: &str,
        photo: &AlbumPhotoRef,
    ) -> Result<PhotoRecord, Dropped> {
        let source_url = photo
            .usable_source_url()
            .ok_or(Dropped::MissingSourceUrl)?;

        if self.dedup.exists(user_id, source_url).await? {
            return Err(Dropped::Duplicate);
        }

        let image = self
            .stager
            .download(&photo.external_id, source_url)
            .await
            .map_err(Dropped::Download)?;

        let outcome = self.enrich_and_persist(user_id, photo, source_url, &image).await;
        image.release();
        outcome
    }

    async fn enrich_and_persist(
        &self,
        user_id: &str,
        photo: &AlbumPhotoRef,
        source_url: &str,
        image: &TransientImage,
    ) -> Result<PhotoRecord, Dropped> {
        let url = self
            .stager
            .upload(&photo.external_id, image)
            .await
            .map_err(Dropped::Stage)?;

        let annotation = self.vision.annotate(&url).await?;
        let category = categorize(&annotation.labels, &annotation.objects, &self.thematic);

        let record = PhotoRecord {
            user_id: user_id.to_string(),
            url,
            labels: annotation.labels,
            landmarks: annotation.landmarks,
            emotions: annotation.faces,
            category,
            date: photo.captured_at.clone(),
        };

        // Another batch for the same user may have stored this photo since the dedup check
        if !crate::db::photos::insert_photo(&self.db, &record, source_url).await? {
            return Err(Dropped::Duplicate);
        }

        Ok(record)
    }

    /// Process a batch of photos for one user
    ///
    /// Never fails: per-photo problems are logged and counted in the report.
    pub async fn analyze_batch(&self, user_id: &str, photos: Vec<AlbumPhotoRef>) -> BatchReport {
        let total = photos.len();

        tracing::info!(
            user_id = %user_id,
            photo_count = total,
            max_concurrent = self.max_concurrent_photos,
            "Starting photo analysis batch"
        );

        let outcomes: Vec<Result<PhotoRecord, Dropped>> = stream::iter(photos)
            .map(move |photo| async move {
                let outcome = self.process_photo(user_id, &photo).await;
                match &outcome {
                    Ok(record) => tracing::debug!(
                        user_id = %user_id,
                        photo_id = %photo.external_id,
                        category = %record.category,
                        faces = record.emotions.len(),
                        "Photo analyzed"
                    ),
                    Err(Dropped::Duplicate) => tracing::info!(
                        user_id = %user_id,
                        photo_id = %photo.external_id,
                        "Skipping duplicate photo"
                    ),
                    Err(Dropped::MissingSourceUrl) => tracing::warn!(
                        user_id = %user_id,
                        photo_id = %photo.external_id,
                        "Photo has no valid image URL"
                    ),
                    Err(dropped) => tracing::error!(
                        user_id = %user_id,
                        photo_id = %photo.external_id,
                        error = %dropped,
                        "Photo processing failed (per-photo error isolation)"
                    ),
                }
                outcome
            })
            .buffer_unordered(self.max_concurrent_photos)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(dropped) if dropped.is_failure() => report.failed += 1,
                Err(_) => report.skipped += 1,
            }
        }

        tracing::info!(
            user_id = %user_id,
            total,
            analyzed = report.records.len(),
            skipped = report.skipped,
            failed = report.failed,
            "Photo analysis batch completed"
        );

        report
    }
}
