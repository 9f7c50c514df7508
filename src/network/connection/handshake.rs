//! Async driver for [`AuthMachine`].
//!
//! Reads lines, performs the store calls the machine asks for and writes its
//! replies until the machine reaches an [`Outcome`].

use crate::error::HandshakeError;
use crate::metrics;
use crate::network::codec::Frame;
use crate::state::machine::{Action, AuthMachine, Input, Outcome};
use crate::store::CredentialStore;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_util::codec::LinesCodecError;
use tracing::{debug, trace, warn};

pub(super) async fn run_handshake<R, W>(
    reader: &mut R,
    writer: &mut W,
    credentials: &dyn CredentialStore,
) -> Result<Outcome, HandshakeError>
where
    R: Stream<Item = Result<Frame, LinesCodecError>> + Unpin,
    W: Sink<String, Error = LinesCodecError> + Unpin,
{
    let mut machine = AuthMachine::new();
    let mut input = Input::Start;

    loop {
        let mut reply = None;
        for action in machine.step(input)? {
            match action {
                Action::Send(line) => writer.send(line).await.map_err(HandshakeError::Write)?,
                Action::Register {
                    username,
                    password_hash,
                } => {
                    let result = credentials.register(&username, &password_hash).await;
                    reply = Some(store_reply("register", &username, result));
                }
                Action::Verify {
                    username,
                    password_hash,
                } => {
                    let result = credentials.verify(&username, &password_hash).await;
                    reply = Some(store_reply("verify", &username, result));
                }
            }
        }

        trace!(state = ?machine.state(), "Handshake step");
        if let Some(outcome) = machine.outcome() {
            return Ok(outcome);
        }

        input = match reply {
            Some(ok) => Input::StoreReply(ok),
            None => {
                debug_assert!(machine.wants_line());
                next_input(reader).await
            }
        };
    }
}

/// A store failure is reported to the client as a plain auth failure.
fn store_reply(
    operation: &'static str,
    username: &str,
    result: Result<bool, crate::store::StoreError>,
) -> bool {
    match result {
        Ok(ok) => ok,
        Err(e) => {
            metrics::record_store_error(operation);
            warn!(%username, operation, error = %e, "Credential store failed");
            false
        }
    }
}

async fn next_input<R>(reader: &mut R) -> Input
where
    R: Stream<Item = Result<Frame, LinesCodecError>> + Unpin,
{
    match reader.next().await {
        Some(Ok(Frame::Line(line))) => Input::Line(line),
        Some(Ok(Frame::TooLong)) => Input::LineTooLong,
        Some(Err(e)) => {
            debug!(error = %e, "Read failed during handshake");
            Input::EndOfStream
        }
        None => Input::EndOfStream,
    }
}
