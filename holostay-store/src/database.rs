use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;
use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.url)
            .await?;

        info!("Postgres pool ready ({} max connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Applies `migrations/` (schema plus the seed catalog)
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Applying holostay schema migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Rooms available for booking; logged at startup to catch an empty catalog
    pub async fn catalog_size(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
    }
}
