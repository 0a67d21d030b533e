use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};

/// Liveness probe of the persistence backend.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
pub struct PgHealthCheck {
    pool: AsyncDbPool,
}

impl PgHealthCheck {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PgHealthCheck {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
