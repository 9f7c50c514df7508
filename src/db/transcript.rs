//! Transcript repository.
//!
//! Append-only log of broadcast lines. Rows are never updated or deleted.

use super::DbError;
use crate::store::LogEntry;
use chrono::SecondsFormat;
use sqlx::SqlitePool;

/// Repository for transcript operations.
pub struct TranscriptRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TranscriptRepository<'a> {
    /// Create a new transcript repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one entry.
    pub async fn append(&self, entry: &LogEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO chat_logs (timestamp, sender_username, message)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
        .bind(&entry.sender)
        .bind(&entry.message)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_logs")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
