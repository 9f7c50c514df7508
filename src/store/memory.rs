//! In-memory store used by unit tests.

use super::{CredentialStore, LogEntry, StoreError, TranscriptSink};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, String>>,
    entries: Mutex<Vec<LogEntry>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn stored_hash(&self, username: &str) -> Option<String> {
        self.users.lock().unwrap().get(username).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn register(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Ok(false);
        }
        users.insert(username.to_string(), password_hash.to_string());
        Ok(true)
    }

    async fn verify(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.get(username).is_some_and(|h| h == password_hash))
    }
}

#[async_trait]
impl TranscriptSink for MemoryStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
