//! Credential and transcript capabilities consumed by the chat core.
//!
//! The connection handshake only sees [`CredentialStore`], and the registry
//! only sees [`TranscriptSink`]. Both are shared as trait objects so the core
//! never depends on the storage engine behind them.

use crate::db::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod noop;
mod sqlite;

pub use noop::NoopTranscript;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(DbError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// One transcript record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub message: String,
}

impl LogEntry {
    /// Entry stamped with the current time.
    pub fn now(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            sender: sender.into(),
            message: message.into(),
        }
    }
}

/// Durable username to password-digest mapping.
///
/// Implementations serialize concurrent callers themselves.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert the credential if `username` is free. `Ok(true)` iff a new row was created.
    async fn register(&self, username: &str, password_hash: &str) -> Result<bool, StoreError>;

    /// `Ok(true)` iff a record for `username` exists with exactly `password_hash`.
    async fn verify(&self, username: &str, password_hash: &str) -> Result<bool, StoreError>;
}

/// Append-only sink for broadcast lines.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), StoreError>;
}
