//! Configuration loader for moim-rs
//!
//! `ConfigLoader` merges the configuration sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "MOIM_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "MOIM_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "MOIM";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources in order of priority (lowest first):
/// 1. `default.toml` - Base default configuration (required)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `MOIM_*` environment variables
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped and only this file is read
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `MOIM_CONFIG_DIR`, `MOIM_CONFIG_FILE` and `MOIM_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `MOIM_CONFIG_DIR` and `MOIM_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir.is_some() {
            return Err(ConfigError::conflicting_sources(
                "MOIM_CONFIG_DIR and MOIM_CONFIG_FILE cannot both be set. \
                 Use MOIM_CONFIG_DIR for layered configuration or \
                 MOIM_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Create a loader that reads a single file (plus environment overrides).
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Create a layered loader rooted at `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
            config_file: None,
            environment: AppEnvironment::from_env(),
        }
    }

    /// Override the environment used to pick the `{environment}.toml` layer.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load, deserialize and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the single configured file) is missing
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // MOIM_SERVER__PORT -> server.port
        Self::add_env_source(builder)
            .build()
            .map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::missing_file(path));
        }

        Ok(builder.add_source(
            File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
        ))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

/// Tests touching `MOIM_*` process environment variables run one at a time.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DatabaseBackend;
    use std::fs;
    use tempfile::TempDir;


    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop.
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn clean_env() -> EnvGuard {
        let mut env = EnvGuard::new();
        for key in [
            CONFIG_DIR_ENV,
            CONFIG_FILE_ENV,
            AppEnvironment::ENV_VAR,
            "MOIM_SERVER__PORT",
            "MOIM_DATABASE__BACKEND",
        ] {
            env.remove(key);
        }
        env
    }

    #[test]
    fn test_config_loader_new_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = clean_env();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir, PathBuf::from("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut env = clean_env();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/config.toml");

        assert!(matches!(
            ConfigLoader::new(),
            Err(ConfigError::ConflictingSources(_))
        ));
    }

    #[test]
    fn test_missing_default_toml() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = clean_env();
        let dir = setup_config_dir(&[]);

        let result = ConfigLoader::from_dir(dir.path()).load();
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_layered_precedence() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = clean_env();
        let dir = setup_config_dir(&[
            ("default.toml", "[server]\nport = 1000\nhost = \"0.0.0.0\"\n"),
            ("production.toml", "[server]\nport = 2000\n"),
            ("local.toml", "[application]\nname = \"local-moim\"\n"),
        ]);

        let settings = ConfigLoader::from_dir(dir.path())
            .with_environment(AppEnvironment::Production)
            .load()
            .expect("Should load layered configuration");
        assert_eq!(settings.server.port, 2000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.application.name, "local-moim");
    }

    #[test]
    fn test_environment_variables_override_files() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut env = clean_env();
        let dir = setup_config_dir(&[(
            "default.toml",
            "[server]\nport = 1000\n[database]\nbackend = \"memory\"\n",
        )]);
        env.set("MOIM_SERVER__PORT", "4321");
        env.set("MOIM_DATABASE__BACKEND", "postgres");

        // postgres without a url fails validation, proving the override was applied
        let result = ConfigLoader::from_dir(dir.path()).load();
        match result {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "database.url"),
            other => panic!("Expected database.url validation error, got {other:?}"),
        }

        env.set("MOIM_DATABASE__BACKEND", "memory");
        let settings = ConfigLoader::from_dir(dir.path()).load().unwrap();
        assert_eq!(settings.server.port, 4321);
        assert_eq!(settings.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn test_single_file_mode() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = clean_env();
        let dir = setup_config_dir(&[("custom.toml", "[server]\nport = 5555\n")]);

        let settings = ConfigLoader::from_file(dir.path().join("custom.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 5555);
    }
}
