//! Photo record database operations
//!
//! Records are append-only: inserted once per (user, source photo), never updated or
//! deleted here. List columns are stored as JSON text.

use moodlens_common::{Error, PhotoRecord, Result};
use serde::de::DeserializeOwned;
use sqlx::{Row, SqlitePool};

/// Does a record already exist for this user and candidate URL?
///
/// A record matches when either its source URL or its stored (durable) URL equals
/// `candidate_url`.
pub async fn photo_exists(pool: &SqlitePool, user_id: &str, candidate_url: &str) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM photos
            WHERE user_id = ? AND (source_url = ? OR url = ?)
        )
        "#,
    )
    .bind(user_id)
    .bind(candidate_url)
    .bind(candidate_url)
    .fetch_one(pool)
    .await?;

    Ok(found != 0)
}

/// Insert a new record
///
/// Returns `false` without writing when a record for `(user_id, source_url)` already
/// exists, which happens when two concurrent batches race on the same photo.
pub async fn insert_photo(pool: &SqlitePool, record: &PhotoRecord, source_url: &str) -> Result<bool> {
    // Prepare all data BEFORE acquiring database connection
    let labels = to_json(&record.labels, "labels")?;
    let landmarks = to_json(&record.landmarks, "landmarks")?;
    let emotions = to_json(&record.emotions, "emotions")?;

    let result = sqlx::query(
        r#"
        INSERT INTO photos (user_id, source_url, url, labels, landmarks, emotions, category, date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, source_url) DO NOTHING
        "#,
    )
    .bind(&record.user_id)
    .bind(source_url)
    .bind(&record.url)
    .bind(&labels)
    .bind(&landmarks)
    .bind(&emotions)
    .bind(&record.category)
    .bind(&record.date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Load every record of a user in insertion order
pub async fn load_photos_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<PhotoRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, url, labels, landmarks, emotions, category, date
        FROM photos
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let labels: String = row.get("labels");
            let landmarks: String = row.get("landmarks");
            let emotions: String = row.get("emotions");

            Ok(PhotoRecord {
                user_id: row.get("user_id"),
                url: row.get("url"),
                labels: from_json(&labels, "labels")?,
                landmarks: from_json(&landmarks, "landmarks")?,
                emotions: from_json(&emotions, "emotions")?,
                category: row.get("category"),
                date: row.get("date"),
            })
        })
        .collect()
}

/// Count records of a user
pub async fn count_photos_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn to_json<T: serde::Serialize>(value: &T, column: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", column, e)))
}

fn from_json<T: DeserializeOwned>(value: &str, column: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}
