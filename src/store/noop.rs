//! No-op transcript sink that discards all entries.
//!
//! Used when `[transcript] enabled = false`.

use super::{LogEntry, StoreError, TranscriptSink};
use async_trait::async_trait;

pub struct NoopTranscript;

#[async_trait]
impl TranscriptSink for NoopTranscript {
    async fn append(&self, _entry: &LogEntry) -> Result<(), StoreError> {
        Ok(())
    }
}
