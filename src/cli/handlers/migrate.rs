//! Migrate command handler

use crate::config::{DatabaseBackend, settings::Settings};
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Lists, applies or reverts migrations.
    ///
    /// # Errors
    /// - The configured backend is not postgres
    /// - Connection or migration failures
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.ensure_postgres()?;
        let url = &self.config.database.url;

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations - database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {name}");
                }
                println!("\nRun without --dry-run to apply them");
            }
            return Ok(());
        }

        match rollback {
            Some(0) => Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            }),
            Some(steps) => {
                println!("Rolling back {steps} migration(s)...");
                let reverted = revert_migrations(url, steps).await?;
                for version in &reverted {
                    println!("  - {version}");
                }
                println!("✓ Rolled back {} migration(s)", reverted.len());
                Ok(())
            }
            None => {
                println!("Running database migrations...");
                let applied = run_pending_migrations(url).await?;
                if applied.is_empty() {
                    println!("✓ No migrations to apply - database is up to date");
                } else {
                    for version in &applied {
                        println!("  - {version}");
                    }
                    println!("✓ Applied {} migration(s)", applied.len());
                }
                Ok(())
            }
        }
    }

    fn ensure_postgres(&self) -> AppResult<()> {
        if self.config.database.backend != DatabaseBackend::Postgres {
            return Err(AppError::Validation {
                field: "database.backend".to_string(),
                reason: "migrations require the postgres backend".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres_config() -> Settings {
        let mut config = Settings::default();
        config.database.backend = DatabaseBackend::Postgres;
        config.database.url = "postgres://localhost/moim_test".to_string();
        config
    }

    #[tokio::test]
    async fn test_memory_backend_is_rejected() {
        let handler = MigrateCommandHandler::new(Settings::default());
        match handler.execute(false, None).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "database.backend"),
            other => panic!("expected backend validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_rollback_steps() {
        let handler = MigrateCommandHandler::new(postgres_config());
        match handler.execute(false, Some(0)).await {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "rollback_steps");
                assert!(reason.contains("greater than 0"));
            }
            other => panic!("expected rollback validation error, got {other:?}"),
        }
    }
}
