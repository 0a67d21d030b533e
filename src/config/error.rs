//! Errors raised while loading or validating configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required configuration file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The merged sources did not fit the `Settings` shape
    #[error("Failed to parse configuration: {0}")]
    Deserialize(String),

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid {
        /// Dotted path, e.g. `server.port`
        field: String,
        message: String,
    },

    #[error("Unknown environment '{0}'. Valid values are: development, test, staging, production")]
    UnknownEnvironment(String),

    /// Two configuration sources that exclude each other were both given
    #[error("Conflicting configuration sources: {0}")]
    ConflictingSources(String),

    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        ConfigError::MissingFile { path: path.into() }
    }

    pub fn conflicting_sources(message: impl Into<String>) -> Self {
        ConfigError::ConflictingSources(message.into())
    }

    /// The offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_only_for_invalid_values() {
        assert_eq!(
            ConfigError::validation("server.port", "must be > 0").field(),
            Some("server.port")
        );
        assert_eq!(ConfigError::missing_file("config/default.toml").field(), None);
    }

    #[test]
    fn test_missing_file_message_names_path() {
        let err = ConfigError::missing_file("config/default.toml");
        assert_eq!(
            err.to_string(),
            "Required configuration file not found: config/default.toml"
        );
    }
}
