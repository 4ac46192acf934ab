//! Photo record model
//!
//! A `PhotoRecord` is the enriched, persisted form of one analyzed photo. Records are
//! append-only: the analysis service creates them and never updates or deletes them.

use serde::{Deserialize, Serialize};

/// Qualitative confidence reported by the vision service for a facial expression
///
/// Wire values are the upper snake case names (`VERY_LIKELY`, ...). Anything the
/// service adds later deserializes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    /// Only `LIKELY` and `VERY_LIKELY` count as an expression being present
    pub fn is_present(self) -> bool {
        matches!(self, Likelihood::Likely | Likelihood::VeryLikely)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Likelihood::Unknown => "UNKNOWN",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }
}

impl From<String> for Likelihood {
    fn from(value: String) -> Self {
        match value.as_str() {
            "VERY_UNLIKELY" => Likelihood::VeryUnlikely,
            "UNLIKELY" => Likelihood::Unlikely,
            "POSSIBLE" => Likelihood::Possible,
            "LIKELY" => Likelihood::Likely,
            "VERY_LIKELY" => Likelihood::VeryLikely,
            _ => Likelihood::Unknown,
        }
    }
}

impl From<Likelihood> for &'static str {
    fn from(value: Likelihood) -> Self {
        value.as_str()
    }
}

/// Expression likelihoods for one detected face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceEmotions {
    #[serde(default)]
    pub joy: Likelihood,
    #[serde(default)]
    pub sorrow: Likelihood,
    #[serde(default)]
    pub anger: Likelihood,
    #[serde(default)]
    pub surprise: Likelihood,
}

/// Persisted photo analysis record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Owner of the photo on the social network
    pub user_id: String,
    /// Durable storage address (never the original source address)
    pub url: String,
    pub labels: Vec<String>,
    pub landmarks: Vec<String>,
    /// One entry per detected face, in the order the vision service reported them
    pub emotions: Vec<FaceEmotions>,
    /// Configured category name or `Uncategorized`
    pub category: String,
    /// Capture date as reported by the photo source; not validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
