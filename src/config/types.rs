//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and auxiliary endpoints.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat listener configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Credential and transcript database.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Transcript persistence toggle.
    #[serde(default)]
    pub transcript: TranscriptConfig,
    /// Line and queue limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name used in log lines.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port. 0 disables the endpoint.
    #[serde(default)]
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: 0,
        }
    }
}

/// Chat listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:12345").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or ":memory:".
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Transcript configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptConfig {
    /// Persist every broadcast line to the database.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// Per-connection limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted line in bytes, excluding the terminator.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Capacity of each member's outgoing queue, in lines.
    #[serde(default = "default_sendq")]
    pub sendq: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            sendq: default_sendq(),
        }
    }
}

fn default_server_name() -> String {
    "relayd".to_string()
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 12345))
}

fn default_database_path() -> String {
    "chat.db".to_string()
}

fn default_max_line_length() -> usize {
    4096
}

fn default_sendq() -> usize {
    256
}

pub(super) fn default_true() -> bool {
    true
}
