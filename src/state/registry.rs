//! Registry of authenticated sessions and the broadcast fan-out.
//!
//! Membership lives in a `DashMap` keyed by [`SessionId`]. Each member owns a
//! bounded outbox drained by its own connection task, so a broadcast never
//! performs socket I/O: it snapshots the outboxes, releases every shard lock,
//! and then `try_send`s the line. A full outbox signals the member's
//! `sendq_exceeded` notifier so its own connection task disconnects it; a
//! closed outbox is skipped. Either way the member stays registered until
//! its own connection cleans up.

use super::id::{SessionId, SessionIdGenerator};
use super::session::Session;
use crate::error::SessionError;
use crate::metrics;
use crate::protocol;
use crate::store::{LogEntry, TranscriptSink};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Registry view of an authenticated session.
#[derive(Debug)]
pub struct Member {
    pub id: SessionId,
    pub username: Arc<str>,
    pub outbox: mpsc::Sender<Arc<str>>,
    pub sendq_exceeded: Arc<Notify>,
}

/// Delivery counts for a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

type Recipient = (SessionId, mpsc::Sender<Arc<str>>, Arc<Notify>);

pub struct Registry {
    members: DashMap<SessionId, Member>,
    transcript: Arc<dyn TranscriptSink>,
    ids: SessionIdGenerator,
}

impl Registry {
    pub fn new(transcript: Arc<dyn TranscriptSink>) -> Self {
        Self {
            members: DashMap::new(),
            transcript,
            ids: SessionIdGenerator::new(),
        }
    }

    pub fn next_id(&self) -> SessionId {
        self.ids.next()
    }

    /// Insert `member`. Returns `false` (and drops the member) if its id is
    /// already present.
    pub fn add(&self, member: Member) -> bool {
        let added = match self.members.entry(member.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!(session = %member.id, username = %member.username, "Member added");
                slot.insert(member);
                true
            }
        };
        metrics::set_members(self.members.len());
        added
    }

    /// Remove the member with `id`. Idempotent: returns whether anything was
    /// removed. Dropping the member closes its outbox.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = self.members.remove(&id).is_some();
        if removed {
            debug!(session = %id, "Member removed");
        }
        metrics::set_members(self.members.len());
        removed
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Relay `message` from `sender` to every other member and record it in
    /// the transcript.
    ///
    /// Transcript failures are logged and never reach the caller. The sender
    /// must be authenticated, but need not be registered.
    pub async fn broadcast(
        &self,
        sender: &Session,
        message: &str,
    ) -> Result<BroadcastReport, SessionError> {
        let username = sender.username().ok_or(SessionError::NotAuthenticated)?;
        let line: Arc<str> = protocol::chat_line(username, message).into();

        let entry = LogEntry::now(username, message);
        if let Err(e) = self.transcript.append(&entry).await {
            metrics::record_store_error("append");
            warn!(session = %sender.id(), error = %e, "Transcript append failed");
        }

        // Snapshot so no shard lock is held while sending.
        let recipients: Vec<Recipient> = self
            .members
            .iter()
            .filter(|m| *m.key() != sender.id())
            .map(|m| (*m.key(), m.outbox.clone(), Arc::clone(&m.sendq_exceeded)))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, outbox, sendq_exceeded) in recipients {
            match outbox.try_send(Arc::clone(&line)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    metrics::record_dropped("full");
                    warn!(session = %id, "SendQ exceeded, disconnecting member");
                    sendq_exceeded.notify_one();
                }
                Err(TrySendError::Closed(_)) => {
                    report.dropped += 1;
                    metrics::record_dropped("closed");
                    debug!(session = %id, "Outbox closed, line dropped");
                }
            }
        }

        metrics::record_broadcast(report.delivered);
        Ok(report)
    }
}
