//! Duplicate photo detection
//!
//! Answers "has this user's photo already been analyzed?" with an equality lookup on
//! the stored records. The check and the later insert are separate statements; the
//! unique `(user_id, source_url)` index catches the insert that loses a race.

use moodlens_common::Result;
use sqlx::SqlitePool;

/// Dedup lookup over the photo store
#[derive(Clone)]
pub struct DedupFilter {
    db: SqlitePool,
}

impl DedupFilter {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// True when a record exists for `(user_id, source_url)`
    pub async fn exists(&self, user_id: &str, source_url: &str) -> Result<bool> {
        let found = crate::db::photos::photo_exists(&self.db, user_id, source_url).await?;
        if found {
            tracing::debug!(user_id = %user_id, source_url = %source_url, "Photo already analyzed");
        }
        Ok(found)
    }
}
