/// Connected catalog database
use crate::{create_pool, run_migrations};
use musicify_core::{MusicifyError, Result};
use sqlx::sqlite::SqlitePool;

/// Owns the pool; cheap to clone
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and bring the schema up to date
    ///
    /// # Errors
    /// Returns an error if the connection fails or migrations fail
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool)
            .await
            .map_err(|e| MusicifyError::Database(format!("Migration failed: {}", e)))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (schema assumed current)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
