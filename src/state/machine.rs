//! Authentication state machine for a freshly accepted connection.
//!
//! ```text
//! Connected ─Start─► AwaitingAction ─login|register─► AwaitingUsername ─name─► AwaitingPassword
//!                          │                                │                        │
//!                    other │                          empty │                        │ password
//!                          ▼                                ▼                        ▼
//!                      Rejected                         Rejected          Registering | LoggingIn
//!                                                                                    │
//!                                                              store says yes ───────┼─── no
//!                                                                     ▼                   ▼
//!                                                               Authenticated          Rejected
//! ```
//!
//! End-of-stream in any awaiting state moves to `Disconnected`. The machine
//! performs no I/O: [`AuthMachine::step`] consumes one [`Input`] and returns
//! the [`Action`]s the driver must carry out. Store calls come back in as
//! [`Input::StoreReply`].

use crate::protocol;
use crate::security::hash_password;
use thiserror::Error;

/// What the client asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Register,
}

impl AuthAction {
    /// Parse the reply to the action prompt (trimmed, case-insensitive).
    pub fn parse(reply: &str) -> Option<Self> {
        let reply = reply.trim();
        if reply.eq_ignore_ascii_case("login") {
            Some(Self::Login)
        } else if reply.eq_ignore_ascii_case("register") {
            Some(Self::Register)
        } else {
            None
        }
    }
}

/// Why a handshake was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidAction,
    InvalidUsername,
    LineTooLong,
    UsernameTaken,
    BadCredentials,
}

impl Rejection {
    /// Static label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAction => "invalid_action",
            Self::InvalidUsername => "invalid_username",
            Self::LineTooLong => "line_too_long",
            Self::UsernameTaken => "username_taken",
            Self::BadCredentials => "bad_credentials",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Connected,
    AwaitingAction,
    AwaitingUsername { action: AuthAction },
    AwaitingPassword { action: AuthAction, username: String },
    Registering { username: String },
    LoggingIn { username: String },
    Authenticated { username: String },
    Rejected(Rejection),
    Disconnected,
}

impl AuthState {
    fn name(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::AwaitingAction => "AwaitingAction",
            Self::AwaitingUsername { .. } => "AwaitingUsername",
            Self::AwaitingPassword { .. } => "AwaitingPassword",
            Self::Registering { .. } => "Registering",
            Self::LoggingIn { .. } => "LoggingIn",
            Self::Authenticated { .. } => "Authenticated",
            Self::Rejected(_) => "Rejected",
            Self::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The connection was just accepted.
    Start,
    /// One line read from the client.
    Line(String),
    /// The client sent a line longer than the configured limit.
    LineTooLong,
    /// The client closed the stream (or the read failed).
    EndOfStream,
    /// Result of the pending register/verify call.
    StoreReply(bool),
}

impl Input {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Line(_) => "Line",
            Self::LineTooLong => "LineTooLong",
            Self::EndOfStream => "EndOfStream",
            Self::StoreReply(_) => "StoreReply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write one line to the client.
    Send(String),
    /// Call `CredentialStore::register`.
    Register {
        username: String,
        password_hash: String,
    },
    /// Call `CredentialStore::verify`.
    Verify {
        username: String,
        password_hash: String,
    },
}

/// Terminal result of a handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Authenticated { username: String },
    Rejected(Rejection),
    Disconnected,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("input {input} is not valid in state {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub input: &'static str,
}

pub struct AuthMachine {
    state: AuthState,
}

impl Default for AuthMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthMachine {
    pub fn new() -> Self {
        Self {
            state: AuthState::Connected,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// The terminal result, once the machine has reached one.
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            AuthState::Authenticated { username } => Some(Outcome::Authenticated {
                username: username.clone(),
            }),
            AuthState::Rejected(reason) => Some(Outcome::Rejected(*reason)),
            AuthState::Disconnected => Some(Outcome::Disconnected),
            _ => None,
        }
    }

    /// Whether the machine is blocked on a line from the client.
    pub fn wants_line(&self) -> bool {
        matches!(
            self.state,
            AuthState::AwaitingAction
                | AuthState::AwaitingUsername { .. }
                | AuthState::AwaitingPassword { .. }
        )
    }

    /// Advance by one input.
    ///
    /// On error the state is left unchanged.
    pub fn step(&mut self, input: Input) -> Result<Vec<Action>, TransitionError> {
        let state = std::mem::replace(&mut self.state, AuthState::Disconnected);
        match Self::transition(state, input) {
            Ok((next, actions)) => {
                self.state = next;
                Ok(actions)
            }
            Err((previous, err)) => {
                self.state = previous;
                Err(err)
            }
        }
    }

    #[allow(clippy::result_large_err)]
    fn transition(
        state: AuthState,
        input: Input,
    ) -> Result<(AuthState, Vec<Action>), (AuthState, TransitionError)> {
        let send = |line: &str| vec![Action::Send(line.to_string())];

        match (state, input) {
            (AuthState::Connected, Input::Start) => {
                Ok((AuthState::AwaitingAction, send(protocol::PROMPT_ACTION)))
            }

            (
                AuthState::AwaitingAction
                | AuthState::AwaitingUsername { .. }
                | AuthState::AwaitingPassword { .. },
                Input::EndOfStream,
            ) => Ok((AuthState::Disconnected, Vec::new())),

            (
                AuthState::AwaitingAction
                | AuthState::AwaitingUsername { .. }
                | AuthState::AwaitingPassword { .. },
                Input::LineTooLong,
            ) => Ok((
                AuthState::Rejected(Rejection::LineTooLong),
                send(protocol::HANDSHAKE_LINE_TOO_LONG),
            )),

            (AuthState::AwaitingAction, Input::Line(reply)) => match AuthAction::parse(&reply) {
                Some(action) => Ok((
                    AuthState::AwaitingUsername { action },
                    send(protocol::PROMPT_USERNAME),
                )),
                None => Ok((
                    AuthState::Rejected(Rejection::InvalidAction),
                    send(protocol::INVALID_ACTION),
                )),
            },

            (AuthState::AwaitingUsername { action }, Input::Line(reply)) => {
                let username = reply.trim();
                if username.is_empty() {
                    Ok((
                        AuthState::Rejected(Rejection::InvalidUsername),
                        send(protocol::INVALID_USERNAME),
                    ))
                } else {
                    Ok((
                        AuthState::AwaitingPassword {
                            action,
                            username: username.to_string(),
                        },
                        send(protocol::PROMPT_PASSWORD),
                    ))
                }
            }

            (AuthState::AwaitingPassword { action, username }, Input::Line(password)) => {
                let password_hash = hash_password(&password);
                match action {
                    AuthAction::Register => Ok((
                        AuthState::Registering {
                            username: username.clone(),
                        },
                        vec![Action::Register {
                            username,
                            password_hash,
                        }],
                    )),
                    AuthAction::Login => Ok((
                        AuthState::LoggingIn {
                            username: username.clone(),
                        },
                        vec![Action::Verify {
                            username,
                            password_hash,
                        }],
                    )),
                }
            }

            (AuthState::Registering { username }, Input::StoreReply(true)) => Ok((
                AuthState::Authenticated { username },
                send(protocol::REGISTER_OK),
            )),
            (AuthState::Registering { .. }, Input::StoreReply(false)) => Ok((
                AuthState::Rejected(Rejection::UsernameTaken),
                send(protocol::REGISTER_FAILED),
            )),

            (AuthState::LoggingIn { username }, Input::StoreReply(true)) => {
                let welcome = protocol::login_ok(&username);
                Ok((
                    AuthState::Authenticated { username },
                    vec![Action::Send(welcome)],
                ))
            }
            (AuthState::LoggingIn { .. }, Input::StoreReply(false)) => Ok((
                AuthState::Rejected(Rejection::BadCredentials),
                send(protocol::LOGIN_FAILED),
            )),

            (state, input) => {
                let err = TransitionError {
                    state: state.name(),
                    input: input.name(),
                };
                Err((state, err))
            }
        }
    }
}
