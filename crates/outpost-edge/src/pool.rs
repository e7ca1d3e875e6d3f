//! # Edge Database Pool
//!
//! Connection pool for the edge replica store. Same SQLite discipline as
//! the central side: WAL journal, NORMAL synchronous, foreign keys on.
//! The sync subsystem itself is single-writer - the pool exists so other
//! local readers can coexist with the worker.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{EdgeError, EdgeResult};
use crate::log::SyncLogRepository;
use crate::migrations;

// =============================================================================
// Configuration
// =============================================================================

/// Edge database configuration.
#[derive(Debug, Clone)]
pub struct EdgeDbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl EdgeDbConfig {
    /// Creates a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EdgeDbConfig {
            database_path: path.into(),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        EdgeDbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Edge replica database handle.
#[derive(Debug, Clone)]
pub struct EdgeDb {
    pool: SqlitePool,
}

impl EdgeDb {
    /// Creates the pool and runs migrations if enabled.
    pub async fn new(config: EdgeDbConfig) -> EdgeResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing edge database"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| EdgeError::Database(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| EdgeError::Database(e.to_string()))?;

        let db = EdgeDb { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> EdgeResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the sync log repository.
    pub fn sync_log(&self) -> SyncLogRepository {
        SyncLogRepository::new(self.pool.clone())
    }

    /// Checks if the database is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        info!("Closing edge database pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }
}
