//! Network module.
//!
//! Contains the Gateway (TCP listener), the line codec and the Connection
//! handler.

pub mod codec;
mod connection;
mod gateway;

pub use connection::{Connection, Disconnect, LoopExit, ServerContext};
pub use gateway::Gateway;
