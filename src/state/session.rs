//! Per-connection session record.

use super::id::SessionId;
use super::registry::Member;
use crate::error::SessionError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};

/// One accepted connection. The username is bound at most once, after a
/// successful handshake.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    addr: SocketAddr,
    username: Option<Arc<str>>,
    sendq_exceeded: Arc<Notify>,
}

impl Session {
    pub fn new(id: SessionId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            username: None,
            sendq_exceeded: Arc::new(Notify::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Signalled by a broadcast that found this session's outbox full.
    pub fn sendq_exceeded(&self) -> &Notify {
        &self.sendq_exceeded
    }

    pub fn bind_username(&mut self, username: impl Into<Arc<str>>) -> Result<(), SessionError> {
        if self.username.is_some() {
            return Err(SessionError::AlreadyBound);
        }
        self.username = Some(username.into());
        Ok(())
    }

    /// Build the registry entry for this session. The registry becomes the
    /// sole owner of `outbox`.
    pub fn admit(&self, outbox: mpsc::Sender<Arc<str>>) -> Result<Member, SessionError> {
        let username = self.username.clone().ok_or(SessionError::NotAuthenticated)?;
        Ok(Member {
            id: self.id,
            username,
            outbox,
            sendq_exceeded: Arc::clone(&self.sendq_exceeded),
        })
    }
}
