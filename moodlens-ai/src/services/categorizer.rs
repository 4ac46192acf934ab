//! Thematic categorizer
//!
//! Maps a photo's labels and detected objects to the first configured category that
//! shares a keyword with them. Pure and deterministic: the answer depends only on the
//! inputs and on the configured category order.

use moodlens_common::{ThematicConfig, UNCATEGORIZED};

/// Return the first category (in configured order) whose keywords contain any label or
/// object, compared case-insensitively; `Uncategorized` when none match.
pub fn categorize(labels: &[String], objects: &[String], config: &ThematicConfig) -> String {
    config
        .categories()
        .iter()
        .find(|category| {
            labels.iter().any(|label| category.matches(label))
                || objects.iter().any(|object| category.matches(object))
        })
        .map(|category| category.name.clone())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}
