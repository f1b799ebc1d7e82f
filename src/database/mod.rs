// region:    --- Imports
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Database Manager

pub struct DatabaseManager {
    pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// Connect a pool from `DATABASE_URL` (pool size via `MAX_CONNECTIONS`, default 5).
    pub async fn new() -> Result<Self, sqlx::Error> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;
        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `f` inside a transaction, committing on `Ok` and rolling back on `Err`.
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Create the schema when absent. Setting `MARKET_RECREATE_DB` drops
    /// everything first; listings and bids otherwise survive restarts.
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        if std::env::var("MARKET_RECREATE_DB").is_ok() {
            info!(
                "{:<12} --> MARKET_RECREATE_DB set, dropping schema",
                "Database"
            );
            let recreate_sql = include_str!("../sql/00-recreate-db.sql");
            self.execute_multi_query(recreate_sql).await?;
        }

        // The listings table doubles as the schema marker.
        let existing: Option<String> = sqlx::query_scalar("SELECT to_regclass('listings')::text")
            .fetch_one(&*self.pool)
            .await?;
        if existing.is_none() {
            info!("{:<12} --> creating schema", "Database");
            let schema_sql = include_str!("../sql/01-create-schema.sql");
            self.execute_multi_query(schema_sql).await?;
        }

        Ok(())
    }

    /// Execute a script of `;`-separated statements one by one.
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }
}

// endregion: --- Database Manager
