//! SQLite-backed [`PostStore`] implementation.
//!
//! Maps the store contract onto the `posts` table created by
//! [`crate::migrate`]. The snapshot includes soft-deleted rows: a slug
//! that was ever persisted is never inserted again.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use postsync_core::error::StoreError;
use postsync_core::models::NormalizedRecord;
use postsync_core::store::PostStore;

/// SQLite implementation of the [`PostStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

/// A row of the `posts` table.
#[derive(Debug, Clone, Serialize)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub metadata: serde_json::Value,
    pub deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch one post by slug, deleted or not.
    pub async fn get_post(&self, slug: &str) -> Result<Option<PostRow>, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, slug, body, metadata, deleted, \
             CAST(created_at AS TEXT) AS created_at, CAST(updated_at AS TEXT) AS updated_at \
             FROM posts WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let metadata: String = row.get("metadata");
        let metadata = serde_json::from_str(&metadata).unwrap_or(serde_json::json!({}));

        Ok(Some(PostRow {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
            body: row.get("body"),
            metadata,
            deleted: row.get("deleted"),
            created_at: format_ts_iso(row.get("created_at")),
            updated_at: format_ts_iso(row.get("updated_at")),
        }))
    }

    /// Number of rows in `posts`, deleted included.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.get("n"))
    }
}

/// SQLite's `CURRENT_TIMESTAMP` text (UTC) as ISO 8601.
fn format_ts_iso(ts: String) -> String {
    chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or(ts)
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError> {
        let rows = sqlx::query("SELECT slug FROM posts")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        Ok(rows.iter().map(|row| row.get::<String, _>("slug")).collect())
    }

    async fn insert(&self, record: &NormalizedRecord) -> Result<(), StoreError> {
        let metadata = record
            .metadata_json()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO posts (title, slug, body, metadata) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.body)
        .bind(&metadata)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate(record.slug.clone())),
            Err(err) => Err(backend(err)),
        }
    }
}
