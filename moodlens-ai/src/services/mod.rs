//! Services for moodlens-ai
//!
//! Photo analysis pipeline and its collaborators:
//! - **album_source** - lists a user's album photos from the Graph API
//! - **dedup_filter** - detects already analyzed photos
//! - **image_stager** / **object_store** - transient download and durable storage
//! - **vision_client** - vision annotation and response normalization
//! - **categorizer** - keyword-based thematic category
//! - **photo_pipeline** - per-photo orchestration with failure isolation
//! - **result_grouper** - emotion and thematic grouping for retrieval

pub mod album_source;
pub mod categorizer;
pub mod dedup_filter;
pub mod image_stager;
pub mod object_store;
pub mod photo_pipeline;
pub mod result_grouper;
pub mod vision_client;

pub use album_source::{AlbumSource, AlbumSourceError, GraphAlbumClient};
pub use categorizer::categorize;
pub use dedup_filter::DedupFilter;
pub use image_stager::{ImageStager, StageError, TransientImage};
pub use object_store::{LocalObjectStore, ObjectStore};
pub use photo_pipeline::{BatchReport, Dropped, PhotoPipeline};
pub use result_grouper::{group_by_emotion, group_by_theme, group_photos};
pub use vision_client::{CloudVisionClient, VisionAnalyzer, VisionError};
