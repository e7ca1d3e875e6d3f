//! Embedded SQL migrations for the edge replica store.
//!
//! Embedded at compile time from `migrations/edge`; run in filename order,
//! tracked in `_sqlx_migrations`. Never modify an existing migration -
//! always add a new one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::EdgeResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/edge");

/// Runs all pending migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> EdgeResult<()> {
    info!("Checking for pending edge migrations");

    MIGRATOR.run(pool).await?;

    info!("All edge migrations applied");
    Ok(())
}
