//! Error types for the connection path.
//!
//! Store and database errors live next to their code (`store`, `db`); this
//! module holds the errors a single session can hit while it is being served.

use crate::state::machine::TransitionError;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

// ============================================================================
// Session Errors (registry and membership)
// ============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is not authenticated")]
    NotAuthenticated,

    #[error("username already bound to this session")]
    AlreadyBound,

    #[error("session {0} is already registered")]
    AlreadyRegistered(crate::state::SessionId),
}

impl SessionError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::AlreadyBound => "already_bound",
            Self::AlreadyRegistered(_) => "already_registered",
        }
    }
}

// ============================================================================
// Handshake Errors
// ============================================================================

/// Failures that abort a handshake before it reaches an outcome.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("write failed: {0}")]
    Write(#[source] LinesCodecError),

    #[error(transparent)]
    Machine(#[from] TransitionError),
}

// ============================================================================
// Connection Errors
// ============================================================================

/// Failures that end a connection after authentication.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
