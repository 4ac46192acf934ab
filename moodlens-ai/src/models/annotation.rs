//! Normalized vision annotation

use moodlens_common::FaceEmotions;
use serde::{Deserialize, Serialize};

/// Vision output after normalization
///
/// Every kind is always present; a kind the service did not return is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub labels: Vec<String>,
    pub landmarks: Vec<String>,
    pub faces: Vec<FaceEmotions>,
    pub objects: Vec<String>,
}
