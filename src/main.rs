//! relayd - multi-user line chat daemon.
//!
//! Accepts TCP connections, authenticates each client against the account
//! store and relays every line from one member to all others, keeping a
//! transcript.

mod config;
mod db;
mod error;
mod http;
mod metrics;
mod network;
mod protocol;
mod security;
mod state;
mod store;
mod telemetry;

use crate::config::Config;
use crate::db::Database;
use crate::network::{Gateway, ServerContext};
use crate::state::Registry;
use crate::store::{CredentialStore, NoopTranscript, TranscriptSink};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "relayd.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    // Load configuration
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if explicit_path.is_none() && !Path::new(&config_path).exists() {
        info!(path = %config_path, "No config file found, using defaults");
        Config::default()
    } else {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    };

    if let Err(errors) = config::validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s), refusing to start", errors.len());
    }

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        database = %config.database.path,
        "Starting relayd"
    );

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    match db.transcript().count().await {
        Ok(count) => info!(entries = count, "Transcript opened"),
        Err(e) => warn!(error = %e, "Failed to count transcript entries"),
    }

    let credentials: Arc<dyn CredentialStore> = Arc::new(db.clone());
    let transcript: Arc<dyn TranscriptSink> = if config.transcript.enabled {
        Arc::new(db.clone())
    } else {
        warn!("Transcript disabled, messages will not be persisted");
        Arc::new(NoopTranscript)
    };

    // Metrics
    metrics::init();
    if config.server.metrics_port != 0 {
        tokio::spawn(http::run_http_server(config.server.metrics_port));
    }

    let ctx = ServerContext {
        registry: Arc::new(Registry::new(transcript)),
        credentials,
        limits: config.limits.clone(),
    };

    let gateway = Gateway::bind(config.listen.address, ctx)
        .await
        .map_err(|e| {
            error!(addr = %config.listen.address, error = %e, "Failed to bind listener");
            e
        })?;

    tokio::select! {
        result = gateway.run() => {
            if let Err(e) = result {
                error!(error = %e, "Gateway stopped");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
            }
        }
    }

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}
