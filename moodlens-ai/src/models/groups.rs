//! Retrieval groupings

use moodlens_common::PhotoRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dominant facial emotion bucket; every record lands in exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionGroupKey {
    Surprise,
    Sorrow,
    Joy,
    Neutral,
}

/// Records partitioned by dominant emotion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionGroups {
    pub surprise: Vec<PhotoRecord>,
    pub sorrow: Vec<PhotoRecord>,
    pub joy: Vec<PhotoRecord>,
    pub neutral: Vec<PhotoRecord>,
}

impl EmotionGroups {
    pub fn push(&mut self, key: EmotionGroupKey, record: PhotoRecord) {
        self.group_mut(key).push(record);
    }

    pub fn group(&self, key: EmotionGroupKey) -> &[PhotoRecord] {
        match key {
            EmotionGroupKey::Surprise => &self.surprise,
            EmotionGroupKey::Sorrow => &self.sorrow,
            EmotionGroupKey::Joy => &self.joy,
            EmotionGroupKey::Neutral => &self.neutral,
        }
    }

    fn group_mut(&mut self, key: EmotionGroupKey) -> &mut Vec<PhotoRecord> {
        match key {
            EmotionGroupKey::Surprise => &mut self.surprise,
            EmotionGroupKey::Sorrow => &mut self.sorrow,
            EmotionGroupKey::Joy => &mut self.joy,
            EmotionGroupKey::Neutral => &mut self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.surprise.len() + self.sorrow.len() + self.joy.len() + self.neutral.len()
    }
}

/// Records keyed by their stored category, including `Uncategorized`
pub type ThematicGroups = BTreeMap<String, Vec<PhotoRecord>>;

/// GET /api/photos/getAnalyzedPhotos response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedPhotos {
    /// Emotion partition
    pub photos: EmotionGroups,
    pub thematic_groups: ThematicGroups,
}
