//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, settings::Settings};

/// Runs the command; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    let environment = cli.env.map_or_else(Environment::from_env, Into::into);
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings, environment)
                .execute(*dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
        Some(Commands::Migrate { dry_run, rollback }) => {
            if let Some(steps) = rollback {
                if *steps > 50 {
                    tracing::warn!(steps, "Rolling back a large number of migrations");
                }
            }
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run() {
        let mut settings = Settings::default();
        settings.jwt.secret = "executor-test-secret-executor-test".to_string();
        let cli = Cli::try_parse_from(["moim-rs", "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_migrate_requires_postgres() {
        let cli = Cli::try_parse_from(["moim-rs", "migrate", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_err());
    }
}
