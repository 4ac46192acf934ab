//! Data models for moodlens-ai
//!
//! - Album photo references produced by the album source
//! - Normalized vision annotations
//! - Emotion and thematic groupings served on retrieval

pub mod album;
pub mod annotation;
pub mod groups;

pub use album::AlbumPhotoRef;
pub use annotation::RawAnnotation;
pub use groups::{EmotionGroupKey, EmotionGroups, GroupedPhotos, ThematicGroups};
