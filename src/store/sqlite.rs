//! SQLite-backed store capabilities.

use super::{CredentialStore, LogEntry, StoreError, TranscriptSink};
use crate::db::Database;
use async_trait::async_trait;

#[async_trait]
impl CredentialStore for Database {
    async fn register(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        Ok(self.accounts().register(username, password_hash).await?)
    }

    async fn verify(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        Ok(self.accounts().verify(username, password_hash).await?)
    }
}

#[async_trait]
impl TranscriptSink for Database {
    async fn append(&self, entry: &LogEntry) -> Result<(), StoreError> {
        Ok(self.transcript().append(entry).await?)
    }
}
