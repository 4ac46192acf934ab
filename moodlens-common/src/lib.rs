//! # moodlens Common Library
//!
//! Shared code for the moodlens services including:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Photo record model (faces, likelihoods) persisted by the analysis service
//! - Thematic category configuration

pub mod config;
pub mod error;
pub mod photo;
pub mod thematic;

pub use error::{Error, Result};
pub use photo::{FaceEmotions, Likelihood, PhotoRecord};
pub use thematic::{ThematicCategory, ThematicConfig, UNCATEGORIZED};
