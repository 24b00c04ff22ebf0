//! Concord database connection pool and initialization.

use std::path::PathBuf;

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    error::{DbError, DbResult},
    sqlite_runtime::create_file_pool,
};

/// Concord database pool wrapper
#[derive(Debug, Clone)]
pub struct ConcordDbPool {
    pool: SqlitePool,
}

impl ConcordDbPool {
    /// Initialize database with migrations
    ///
    /// This function:
    /// 1. Ensures the data directory exists
    /// 2. Creates/connects to the database
    /// 3. Runs migrations
    pub async fn new(db_path_override: Option<&str>) -> DbResult<Self> {
        let db_path = match db_path_override {
            Some(p) => PathBuf::from(p),
            None => Self::db_path()?,
        };
        info!("Initializing Concord database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let pool = create_file_pool(&db_path, 5).await?;

        Self::run_migrations(&pool).await?;

        info!("Concord database initialized successfully");
        Ok(Self { pool })
    }

    /// Get the inner SQLx pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the default database file path
    pub fn db_path() -> DbResult<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(DbError::NoConfigDir)?;
        Ok(data_dir.join("concord").join("concord.sqlite3"))
    }

    /// Run database migrations using sqlx migrate macro
    async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;

        info!("Concord database migrations completed");
        Ok(())
    }

    /// Close the pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create a ConcordDbPool from an existing SqlitePool (for testing)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
