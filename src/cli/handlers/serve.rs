//! Serve command handler

use crate::config::{DatabaseBackend, Environment, StorageBackend, settings::Settings};
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Runs the server, or with `dry_run` only checks the configuration.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()
        } else {
            Server::new(self.config, self.environment).run().await
        }
    }

    /// Everything the server checks before binding, without touching the network.
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        self.config.jwt.validate()?;
        for warning in self.environment.check_deployment(&self.config)? {
            println!("! {warning}");
        }

        let database = match self.config.database.backend {
            DatabaseBackend::Memory => "memory",
            DatabaseBackend::Postgres => "postgres",
        };
        let storage = match self.config.storage.backend {
            StorageBackend::Memory => "memory",
            StorageBackend::S3 => "s3",
        };

        println!("✓ Configuration is valid for {}", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Database backend: {database}");
        println!("✓ Storage backend: {storage}");
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
