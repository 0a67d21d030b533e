//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use crate::api::routes::create_router;
use crate::config::{DatabaseBackend, Environment, settings::Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::storage::build_storage;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Start the server and run until shutdown signal
    ///
    /// # Errors
    /// - Invalid JWT configuration
    /// - Settings unfit for the deployment environment
    /// - Database pool or migration failures
    /// - Object storage initialization errors
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_configuration();

        self.settings.jwt.validate().map_err(|e| {
            tracing::error!(error = %e, "JWT configuration validation failed");
            anyhow::anyhow!("JWT configuration validation failed: {e}")
        })?;
        for warning in self.environment.check_deployment(&self.settings)? {
            tracing::warn!(environment = %self.environment, "{warning}");
        }

        let repos = self.build_repositories().await?;

        let storage = build_storage(&self.settings.storage).await?;
        tracing::info!(backend = ?self.settings.storage.backend, "Object storage ready");

        let state = AppState::new(repos, storage, &self.settings)?;
        let router = create_router(state);

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {address}: {e}")
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    async fn build_repositories(&self) -> anyhow::Result<Repositories> {
        let database = &self.settings.database;
        match database.backend {
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory repositories; data is lost on shutdown");
                Ok(Repositories::in_memory())
            }
            DatabaseBackend::Postgres => {
                if database.auto_migrate {
                    let applied = run_pending_migrations(&database.url).await?;
                    tracing::info!(count = applied.len(), "Pending migrations applied");
                }

                tracing::info!("Initializing database connection pool...");
                let pool = establish_async_connection_pool(database).await?;
                tracing::info!("Database connection pool initialized");
                Ok(Repositories::postgres(pool))
            }
        }
    }

    fn log_configuration(&self) {
        let settings = &self.settings;
        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %self.environment,
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = %settings.server.port,
            request_timeout = %settings.server.request_timeout,
            max_upload_size = %settings.server.max_upload_size,
            frontend_url = %settings.application.frontend_url,
            "Server configuration loaded"
        );
        tracing::info!(
            backend = ?settings.database.backend,
            max_connections = %settings.database.max_connections,
            auto_migrate = %settings.database.auto_migrate,
            "Database configuration loaded"
        );
        tracing::info!(
            access_token_expiration = %settings.jwt.access_token_expiration,
            guest_token_expiration = %settings.jwt.guest_token_expiration,
            secret_configured = %(!settings.jwt.secret.is_empty()),
            "JWT configuration loaded"
        );
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
