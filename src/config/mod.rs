//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and TOML loading
//! - [`validation`]: startup checks

mod types;
pub mod validation;

pub use types::{Config, ConfigError, LimitsConfig};
