//! Embedded SQL migrations for the central store.
//!
//! The `sqlx::migrate!()` macro embeds all SQL files from
//! `migrations/central` into the binary at compile time; no runtime file
//! access is needed. Migrations run in filename order, each inside its own
//! transaction, and are tracked in `_sqlx_migrations`. Never modify an
//! existing migration - always add a new one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::CentralResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/central");

/// Runs all pending migrations. Idempotent: safe to run multiple times.
pub async fn run_migrations(pool: &SqlitePool) -> CentralResult<()> {
    info!("Checking for pending central migrations");

    MIGRATOR.run(pool).await?;

    info!("All central migrations applied");
    Ok(())
}
