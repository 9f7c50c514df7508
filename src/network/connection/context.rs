use crate::config::LimitsConfig;
use crate::state::Registry;
use crate::store::CredentialStore;
use std::sync::Arc;

/// Shared resources handed to every connection task.
///
/// Built once in `main`; cloning only bumps reference counts.
#[derive(Clone)]
pub struct ServerContext {
    /// Authenticated members and the broadcast fan-out.
    pub registry: Arc<Registry>,
    /// Account storage consulted during the handshake.
    pub credentials: Arc<dyn CredentialStore>,
    /// Line length and send queue limits.
    pub limits: LimitsConfig,
}
