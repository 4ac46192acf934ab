//! Thematic category configuration
//!
//! Categories are kept in the order they were configured: the categorizer returns the
//! first category whose keywords match, so reordering changes results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Category assigned when no configured keyword matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One named category and its keyword set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThematicCategory {
    pub name: String,
    pub keywords: BTreeSet<String>,
}

impl ThematicCategory {
    /// Create a category; keywords are stored lowercase and trimmed
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive keyword membership
    pub fn matches(&self, term: &str) -> bool {
        self.keywords.contains(&term.to_lowercase())
    }
}

/// Ordered keyword dictionary used by the categorizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThematicConfig {
    categories: Vec<ThematicCategory>,
}

impl ThematicConfig {
    pub fn new(categories: Vec<ThematicCategory>) -> Self {
        // Keywords may come from TOML in any case
        let categories = categories
            .into_iter()
            .map(|c| ThematicCategory::new(c.name, c.keywords))
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[ThematicCategory] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for ThematicConfig {
    fn default() -> Self {
        Self::new(vec![
            ThematicCategory::new("Adventures", ["hiking", "swimming", "camping"]),
            ThematicCategory::new("Celebrations", ["birthday", "wedding", "party"]),
        ])
    }
}
