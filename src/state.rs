//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{JwtConfig, Settings};
use crate::error::AppResult;
use crate::repositories::{HealthCheck, Repositories};
use crate::services::Services;
use crate::storage::ObjectStorage;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since services, repositories and storage sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Liveness probe of the persistence backend
    pub health: Arc<dyn HealthCheck>,
    /// JWT configuration for token validation and cookie flags
    pub jwt_config: JwtConfig,
    /// Reported by the health endpoint
    pub version: String,
    /// Upper bound for a single uploaded file
    pub max_upload_size: usize,
    /// Web client origin allowed by CORS
    pub frontend_url: String,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wires services on top of the given repositories and object storage.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let storage = build_storage(&settings.storage).await?;
    /// let state = AppState::new(Repositories::postgres(pool), storage, &settings)?;
    /// ```
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        settings: &Settings,
    ) -> AppResult<Self> {
        let health = repos.health.clone();
        let services = Services::new(repos, storage, settings)?;
        Ok(Self {
            services,
            health,
            jwt_config: settings.jwt.clone(),
            version: settings.application.version.clone(),
            max_upload_size: settings.server.max_upload_size,
            frontend_url: settings.application.frontend_url.clone(),
            request_timeout: Duration::from_secs(settings.server.request_timeout),
        })
    }
}
