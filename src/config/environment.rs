//! Deployment environment selection and the rules each environment imposes.

use crate::config::error::ConfigError;
use crate::config::settings::{DatabaseBackend, Settings, StorageBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Picks the `{environment}.toml` configuration layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub const ENV_VAR: &'static str = "MOIM_APP_ENV";
    pub const ALL: [Environment; 4] = [
        Environment::Development,
        Environment::Test,
        Environment::Staging,
        Environment::Production,
    ];

    /// Reads `MOIM_APP_ENV`; unset or unknown values mean development.
    pub fn from_env() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|e: ConfigError| {
                tracing::warn!(error = %e, "Falling back to development environment");
                Environment::Development
            }),
            Err(_) => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Staging and production serve real users.
    pub fn is_deployed(&self) -> bool {
        matches!(self, Environment::Staging | Environment::Production)
    }

    /// Settings that are acceptable locally but not where real users are served.
    ///
    /// Production refuses them outright; staging only reports them.
    pub fn check_deployment(&self, settings: &Settings) -> Result<Vec<String>, ConfigError> {
        if !self.is_deployed() {
            return Ok(Vec::new());
        }

        let mut problems = Vec::new();
        if settings.database.backend == DatabaseBackend::Memory {
            problems.push(ConfigError::validation(
                "database.backend",
                "in-memory repositories lose all data on restart",
            ));
        }
        if settings.storage.backend == StorageBackend::Memory {
            problems.push(ConfigError::validation(
                "storage.backend",
                "in-memory storage loses uploaded images on restart",
            ));
        }
        if !settings.jwt.cookie_secure {
            problems.push(ConfigError::validation(
                "jwt.cookie_secure",
                "access token cookie would be sent over plain HTTP",
            ));
        }

        if *self == Environment::Production {
            if let Some(first) = problems.into_iter().next() {
                return Err(first);
            }
            return Ok(Vec::new());
        }
        Ok(problems.iter().map(ToString::to_string).collect())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let short = match wanted.as_str() {
            "dev" => "development",
            "stage" => "staging",
            "prod" => "production",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == short)
            .ok_or_else(|| ConfigError::UnknownEnvironment(s.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployable() -> Settings {
        let mut settings = Settings::default();
        settings.database.backend = DatabaseBackend::Postgres;
        settings.database.url = "postgres://db/moim".to_string();
        settings.storage.backend = StorageBackend::S3;
        settings.jwt.cookie_secure = true;
        settings
    }

    #[test]
    fn test_short_names_and_case() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("stage".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!(" PROD ".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
    }

    #[test]
    fn test_unknown_environment() {
        match "qa".parse::<Environment>() {
            Err(ConfigError::UnknownEnvironment(value)) => assert_eq!(value, "qa"),
            other => panic!("expected unknown environment, got {other:?}"),
        }
    }

    #[test]
    fn test_display_matches_file_stem() {
        for env in Environment::ALL {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_local_environments_skip_deployment_checks() {
        let settings = Settings::default();
        assert!(Environment::Development.check_deployment(&settings).unwrap().is_empty());
        assert!(Environment::Test.check_deployment(&settings).unwrap().is_empty());
    }

    #[test]
    fn test_production_refuses_memory_backends() {
        let mut settings = deployable();
        assert!(Environment::Production.check_deployment(&settings).unwrap().is_empty());

        settings.database.backend = DatabaseBackend::Memory;
        let err = Environment::Production.check_deployment(&settings).unwrap_err();
        assert_eq!(err.field(), Some("database.backend"));
    }

    #[test]
    fn test_staging_only_reports() {
        let warnings = Environment::Staging
            .check_deployment(&Settings::default())
            .unwrap();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("database.backend"));
    }
}
