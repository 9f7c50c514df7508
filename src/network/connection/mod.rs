//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task through two phases:
//!
//! ```text
//! Phase 1: Handshake (AuthMachine driven over FramedRead/FramedWrite)
//!    ↓  authenticated: bind username, admit into Registry
//! Phase 2: Message loop (tokio::select!)
//!    ┌──────────────────────────────────────────────┐
//!    │  FramedRead ──► broadcast ──► other outboxes │
//!    │  outbox     ──► FramedWrite                  │
//!    └──────────────────────────────────────────────┘
//!    ↓
//! Cleanup: Registry::remove (exactly once), close the writer
//! ```

mod context;
mod event_loop;
mod handshake;

pub use context::ServerContext;
pub use event_loop::LoopExit;

use crate::error::{ConnectionError, SessionError};
use crate::metrics;
use crate::network::codec::ChatCodec;
use crate::protocol;
use crate::state::{Outcome, Rejection, Session, SessionId};
use crate::telemetry::spans;
use event_loop::run_message_loop;
use futures_util::SinkExt;
use handshake::run_handshake;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, instrument};

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The handshake refused the client.
    Rejected(Rejection),
    /// The client went away during the handshake.
    HandshakeAborted,
    /// An admitted member left the message loop.
    Left(LoopExit),
}

/// A client connection handler.
pub struct Connection<S> {
    session: Session,
    stream: S,
    ctx: ServerContext,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(id: SessionId, stream: S, addr: SocketAddr, ctx: ServerContext) -> Self {
        Self {
            session: Session::new(id, addr),
            stream,
            ctx,
        }
    }

    /// Serve the connection until the client leaves or is rejected.
    #[instrument(
        skip(self),
        fields(session = %self.session.id(), addr = %self.session.addr()),
        name = "connection"
    )]
    pub async fn run(mut self) -> Result<Disconnect, ConnectionError> {
        let max_line_length = self.ctx.limits.max_line_length;
        let (read, write) = tokio::io::split(self.stream);
        let mut reader = FramedRead::new(read, ChatCodec::new(max_line_length));
        let mut writer = FramedWrite::new(write, ChatCodec::new(max_line_length));

        let outcome = run_handshake(&mut reader, &mut writer, self.ctx.credentials.as_ref())
            .instrument(spans::handshake())
            .await;

        let username = match outcome {
            Ok(Outcome::Authenticated { username }) => username,
            Ok(Outcome::Rejected(reason)) => {
                metrics::record_auth(reason.as_str());
                info!(reason = reason.as_str(), "Handshake rejected");
                let _ = writer.close().await;
                return Ok(Disconnect::Rejected(reason));
            }
            Ok(Outcome::Disconnected) => {
                metrics::record_auth("disconnected");
                debug!("Client left during handshake");
                return Ok(Disconnect::HandshakeAborted);
            }
            Err(e) => {
                metrics::record_auth("error");
                return Err(e.into());
            }
        };
        metrics::record_auth("authenticated");

        let span = spans::member(&username);
        self.session.bind_username(username)?;

        let (outbox_tx, mut outbox) = mpsc::channel(self.ctx.limits.sendq);
        let member = self.session.admit(outbox_tx)?;
        let id = self.session.id();
        if !self.ctx.registry.add(member) {
            return Err(SessionError::AlreadyRegistered(id).into());
        }

        let session = &self.session;
        let registry = self.ctx.registry.as_ref();
        let exit = async {
            info!(members = registry.len(), "Member joined");
            if let Err(e) = writer.send(protocol::CHAT_INSTRUCTIONS.to_string()).await {
                debug!(error = %e, "Write failed");
                return LoopExit::WriteError;
            }
            run_message_loop(&mut reader, &mut writer, session, registry, &mut outbox).await
        }
        .instrument(span)
        .await;

        self.ctx.registry.remove(id);
        let _ = writer.close().await;

        if exit.is_clean() {
            info!("Member quit");
        } else {
            info!(reason = exit.as_str(), "Member disconnected");
        }
        Ok(Disconnect::Left(exit))
    }
}
