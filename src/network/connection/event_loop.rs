//! Message loop for an admitted member.
//!
//! A single `select!` multiplexes the client's input against the member's
//! outbox. Input lines become broadcasts; outbox lines are written back to
//! the client in the order they were queued. A broadcast that finds the
//! outbox full signals the session, and the loop ends after a notice.

use crate::network::codec::Frame;
use crate::protocol;
use crate::state::{Registry, Session};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::codec::LinesCodecError;
use tracing::{debug, warn};

/// Why the message loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The client sent the exit command.
    Quit,
    /// The client closed its side of the connection.
    EndOfStream,
    /// Reading from the client failed.
    ReadError,
    /// Writing to the client failed.
    WriteError,
    /// The member was removed from the registry and its outbox closed.
    Removed,
    /// The outbox overflowed because the client read too slowly.
    SendQExceeded,
}

impl LoopExit {
    /// Only an explicit quit counts as a clean exit.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Quit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::EndOfStream => "end_of_stream",
            Self::ReadError => "read_error",
            Self::WriteError => "write_error",
            Self::Removed => "removed",
            Self::SendQExceeded => "sendq_exceeded",
        }
    }
}

pub(super) async fn run_message_loop<R, W>(
    reader: &mut R,
    writer: &mut W,
    session: &Session,
    registry: &Registry,
    outbox: &mut mpsc::Receiver<Arc<str>>,
) -> LoopExit
where
    R: Stream<Item = Result<Frame, LinesCodecError>> + Unpin,
    W: Sink<String, Error = LinesCodecError> + Unpin,
{
    loop {
        tokio::select! {
            incoming = reader.next() => match incoming {
                Some(Ok(Frame::Line(line))) => {
                    if protocol::is_exit_command(&line) {
                        return LoopExit::Quit;
                    }
                    if let Err(e) = registry.broadcast(session, &line).await {
                        warn!(error = %e, code = e.error_code(), "Broadcast refused");
                    }
                }
                Some(Ok(Frame::TooLong)) => {
                    debug!("Oversized line discarded");
                    if let Err(e) = writer.send(protocol::LINE_TOO_LONG.to_string()).await {
                        debug!(error = %e, "Write failed");
                        return LoopExit::WriteError;
                    }
                }
                Some(Err(e)) => {
                    debug!(error = %e, "Read failed");
                    return LoopExit::ReadError;
                }
                None => return LoopExit::EndOfStream,
            },
            outgoing = outbox.recv() => match outgoing {
                Some(line) => {
                    if let Err(e) = writer.send(line.to_string()).await {
                        debug!(error = %e, "Write failed");
                        return LoopExit::WriteError;
                    }
                }
                None => return LoopExit::Removed,
            },
            () = session.sendq_exceeded().notified() => {
                if let Err(e) = writer.send(protocol::SENDQ_EXCEEDED.to_string()).await {
                    debug!(error = %e, "Write failed");
                }
                return LoopExit::SendQExceeded;
            }
        }
    }
}
