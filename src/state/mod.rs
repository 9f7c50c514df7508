//! Connection state: sessions, the authentication machine and the registry
//! of authenticated members.

mod id;
pub mod machine;
mod registry;
mod session;

pub use id::{SessionId, SessionIdGenerator};
pub use machine::{AuthMachine, Outcome, Rejection};
pub use registry::{BroadcastReport, Member, Registry};
pub use session::Session;
