//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Smallest line limit that still fits every handshake prompt.
const MIN_LINE_LENGTH: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.sendq must be at least 1")]
    ZeroSendq,
    #[error("limits.max_line_length must be at least {MIN_LINE_LENGTH}, got {0}")]
    LineLengthTooSmall(usize),
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if config.limits.sendq == 0 {
        errors.push(ValidationError::ZeroSendq);
    }
    if config.limits.max_line_length < MIN_LINE_LENGTH {
        errors.push(ValidationError::LineLengthTooSmall(
            config.limits.max_line_length,
        ));
    }

    let db_path = &config.database.path;
    if db_path != ":memory:"
        && let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(
            parent.display().to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::default();
        config.server.name = "  ".to_string();
        config.limits.sendq = 0;
        config.limits.max_line_length = 10;
        config.database.path = "/definitely/not/here/chat.db".to_string();

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServerName)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroSendq)));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::LineLengthTooSmall(10)))
        );
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::DatabasePathInvalid(_)))
        );
    }

    #[test]
    fn memory_database_needs_no_directory() {
        let mut config = Config::default();
        config.database.path = ":memory:".to_string();
        assert!(validate(&config).is_ok());
    }
}
