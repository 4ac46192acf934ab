//! Database access for moodlens-ai
//!
//! SQLite store for analyzed photo records

pub mod photos;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Initialize database connection pool
///
/// Creates the database file (and its parent directory) if missing, then the tables.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .busy_timeout(std::time::Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the photos table and its indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            source_url TEXT NOT NULL,
            url TEXT NOT NULL,
            labels TEXT NOT NULL DEFAULT '[]',
            landmarks TEXT NOT NULL DEFAULT '[]',
            emotions TEXT NOT NULL DEFAULT '[]',
            category TEXT NOT NULL,
            date TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_user_id ON photos (user_id)")
        .execute(pool)
        .await?;

    // One record per (user, source photo)
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_photos_user_source ON photos (user_id, source_url)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (photos)");

    Ok(())
}
