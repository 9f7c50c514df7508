//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket and spawns a Connection task for each
//! incoming client.

use crate::metrics;
use crate::network::{Connection, ServerContext};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    ctx: ServerContext,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, ctx: ServerContext) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listener bound");
        Ok(Self { listener, ctx })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    metrics::record_connection();
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let id = self.ctx.registry.next_id();
                    info!(session = %id, %addr, "Connection accepted");

                    let connection = Connection::new(id, stream, addr, self.ctx.clone());
                    tokio::spawn(async move {
                        match connection.run().await {
                            Ok(disconnect) => {
                                debug!(session = %id, %addr, ?disconnect, "Connection closed");
                            }
                            Err(e) => {
                                warn!(session = %id, %addr, error = %e, "Connection error");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
