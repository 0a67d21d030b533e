//! Configuration validation logic
//!
//! Validation methods for the configuration structures. Each failure names the
//! dotted path of the offending field.

use crate::config::error::ConfigError;
use crate::config::settings::{
    ApplicationConfig, DatabaseBackend, DatabaseConfig, FileSettings, LoggerSettings,
    ServerConfig, Settings, StorageBackend, StorageConfig,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ApplicationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.frontend_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::validation(
                "application.frontend_url",
                "Frontend URL must start with http:// or https://.",
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request and keep-alive timeouts must be greater than 0
    /// - Upload limit must be at least 1 KiB
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.max_upload_size < 1024 {
            return Err(ConfigError::validation(
                "server.max_upload_size",
                "Upload limit must be at least 1024 bytes.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// The URL is only required for the postgres backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == DatabaseBackend::Postgres {
            if self.url.is_empty() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Database URL is required for the postgres backend.",
                ));
            }

            if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
                return Err(ConfigError::validation(
                    "database.url",
                    "Invalid database URL format. Expected postgres://[user:password@]host[:port]/database",
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_base_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "storage.public_base_url",
                "Public base URL cannot be empty.",
            ));
        }

        if self.backend == StorageBackend::S3 {
            if self.bucket.trim().is_empty() {
                return Err(ConfigError::validation(
                    "storage.bucket",
                    "Bucket is required for the s3 backend.",
                ));
            }
            if self.access_key.is_some() != self.secret_key.is_some() {
                return Err(ConfigError::validation(
                    "storage.access_key",
                    "access_key and secret_key must be set together.",
                ));
            }
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        if self.rotation.max_files == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_files",
                "At least one log file must be kept.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validates every section and returns the first error encountered.
    ///
    /// JWT settings are checked separately at server start so that commands
    /// like `migrate` run without a signing secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.application.validate()?;
        self.server.validate()?;
        self.database.validate()?;
        self.storage.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::Invalid { field, .. } => field,
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "server.port");
    }

    #[test]
    fn test_server_config_upload_limit() {
        let config = ServerConfig {
            max_upload_size: 10,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.max_upload_size"
        );
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let config = DatabaseConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let config = DatabaseConfig {
            backend: DatabaseBackend::Postgres,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "database.url");

        let config = DatabaseConfig {
            backend: DatabaseBackend::Postgres,
            url: "mysql://localhost/db".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "database.url");
    }

    #[test]
    fn test_min_connections_cannot_exceed_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "database.min_connections"
        );
    }

    #[test]
    fn test_s3_credentials_must_come_in_pairs() {
        let config = StorageConfig {
            backend: StorageBackend::S3,
            access_key: Some("AKIA".to_string()),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "storage.access_key");
    }

    #[test]
    fn test_frontend_url_scheme() {
        let config = ApplicationConfig {
            frontend_url: "localhost:5173".to_string(),
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "application.frontend_url"
        );
    }

    #[test]
    fn test_logger_invalid_level_and_format() {
        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");

        let mut settings = LoggerSettings::default();
        settings.file.format = "xml".to_string();
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.format"
        );
    }
}
