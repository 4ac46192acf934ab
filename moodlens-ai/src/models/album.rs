//! Album photo references

use serde::{Deserialize, Serialize};

/// One photo as listed by the social network, before any processing
///
/// Ephemeral: only the derived `PhotoRecord` is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPhotoRef {
    /// Photo id on the social network
    pub external_id: String,
    /// Candidate image URL (largest rendition); `None` when the listing had no usable image
    pub source_image_url: Option<String>,
    /// Capture date string as reported by the source
    pub captured_at: Option<String>,
}

impl AlbumPhotoRef {
    pub fn new(external_id: impl Into<String>, source_image_url: Option<String>) -> Self {
        Self {
            external_id: external_id.into(),
            source_image_url,
            captured_at: None,
        }
    }

    pub fn with_captured_at(mut self, captured_at: Option<String>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Source URL if present and non-blank
    pub fn usable_source_url(&self) -> Option<&str> {
        self.source_image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_source_url_is_unusable() {
        assert_eq!(AlbumPhotoRef::new("1", None).usable_source_url(), None);
        assert_eq!(
            AlbumPhotoRef::new("1", Some("   ".to_string())).usable_source_url(),
            None
        );
        assert_eq!(
            AlbumPhotoRef::new("1", Some("http://x/1.jpg".to_string())).usable_source_url(),
            Some("http://x/1.jpg")
        );
    }
}
