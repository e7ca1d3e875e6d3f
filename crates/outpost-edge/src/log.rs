//! # Edge Sync Log
//!
//! The edge's own durable record of every sync attempt: an append-only
//! log row per attempt (`InProgress` → `Success` | `Failed`), one child
//! row per table with the count and hash the edge itself recomputed after
//! loading, and the single-row-per-key `edge_sync_state` marker holding
//! the most recently applied manifest id.
//!
//! The per-table rows are the edge's local proof of what it actually has,
//! independent of what the manifest claimed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::EdgeResult;
use outpost_core::timefmt;

/// State key for the most recently applied manifest.
pub const LAST_MANIFEST_KEY: &str = "last_manifest_id";

// =============================================================================
// Log Row Types
// =============================================================================

/// One `edge_sync_log` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncAttemptRecord {
    pub id: i64,
    pub manifest_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub duration_ms: i64,
    pub error_text: Option<String>,
}

/// One `edge_sync_table` row: a verified table's recomputed count/hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncTableRecord {
    pub id: i64,
    pub edge_sync_log_id: i64,
    pub table_name: String,
    pub row_count: i64,
    pub content_hash: String,
}

/// A verified table result, as recomputed by the processor.
#[derive(Debug, Clone)]
pub struct TableCheck {
    pub table_name: String,
    pub row_count: i64,
    pub content_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the edge sync log and state marker.
#[derive(Debug, Clone)]
pub struct SyncLogRepository {
    pool: SqlitePool,
}

impl SyncLogRepository {
    /// Creates a new SyncLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SyncLogRepository { pool }
    }

    // =========================================================================
    // Attempt Lifecycle
    // =========================================================================

    /// Opens a new attempt with status `InProgress`, returning its log id.
    pub async fn open_attempt(&self, manifest_id: &str) -> EdgeResult<i64> {
        let result = sqlx::query(
            "INSERT INTO edge_sync_log (manifest_id, started_at, status)
             VALUES (?1, ?2, 'InProgress')",
        )
        .bind(manifest_id)
        .bind(timefmt::format(&Utc::now()))
        .execute(&self.pool)
        .await?;

        let log_id = result.last_insert_rowid();
        debug!(manifest_id = %manifest_id, log_id, "Opened sync attempt");
        Ok(log_id)
    }

    /// Marks an attempt `Success` with its elapsed duration.
    pub async fn mark_success(&self, log_id: i64, duration_ms: i64) -> EdgeResult<()> {
        sqlx::query(
            "UPDATE edge_sync_log
             SET status = 'Success', completed_at = ?2, duration_ms = ?3, error_text = NULL
             WHERE id = ?1",
        )
        .bind(log_id)
        .bind(timefmt::format(&Utc::now()))
        .bind(duration_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks an attempt `Failed` with its elapsed duration and error text.
    pub async fn mark_failed(&self, log_id: i64, duration_ms: i64, error: &str) -> EdgeResult<()> {
        sqlx::query(
            "UPDATE edge_sync_log
             SET status = 'Failed', completed_at = ?2, duration_ms = ?3, error_text = ?4
             WHERE id = ?1",
        )
        .bind(log_id)
        .bind(timefmt::format(&Utc::now()))
        .bind(duration_ms)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records the recomputed per-table results of a successful attempt.
    pub async fn record_tables(&self, log_id: i64, checks: &[TableCheck]) -> EdgeResult<()> {
        for check in checks {
            sqlx::query(
                "INSERT INTO edge_sync_table (edge_sync_log_id, table_name, row_count, content_hash)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(log_id)
            .bind(&check.table_name)
            .bind(check.row_count)
            .bind(&check.content_hash)
            .execute(&self.pool)
            .await?;
        }

        debug!(log_id, tables = checks.len(), "Recorded table results");
        Ok(())
    }

    // =========================================================================
    // Durable State Marker
    // =========================================================================

    /// Upserts the `last_manifest_id` marker.
    pub async fn set_last_manifest(&self, manifest_id: &str) -> EdgeResult<()> {
        sqlx::query(
            "INSERT INTO edge_sync_state (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
        )
        .bind(LAST_MANIFEST_KEY)
        .bind(manifest_id)
        .bind(timefmt::format(&Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the most recently applied manifest id, if any sync has ever
    /// succeeded.
    pub async fn last_manifest_id(&self) -> EdgeResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM edge_sync_state WHERE key = ?1")
                .bind(LAST_MANIFEST_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    // =========================================================================
    // Reads (observability and tests)
    // =========================================================================

    /// The most recent attempt, if any.
    pub async fn latest_attempt(&self) -> EdgeResult<Option<SyncAttemptRecord>> {
        let row = sqlx::query_as::<_, SyncAttemptRecord>(
            "SELECT id, manifest_id, started_at, completed_at, status, duration_ms, error_text
             FROM edge_sync_log ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All attempts for one manifest, oldest first.
    pub async fn attempts_for_manifest(
        &self,
        manifest_id: &str,
    ) -> EdgeResult<Vec<SyncAttemptRecord>> {
        let rows = sqlx::query_as::<_, SyncAttemptRecord>(
            "SELECT id, manifest_id, started_at, completed_at, status, duration_ms, error_text
             FROM edge_sync_log WHERE manifest_id = ?1 ORDER BY id ASC",
        )
        .bind(manifest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The per-table results of one attempt, in insertion order.
    pub async fn tables_for_attempt(&self, log_id: i64) -> EdgeResult<Vec<SyncTableRecord>> {
        let rows = sqlx::query_as::<_, SyncTableRecord>(
            "SELECT id, edge_sync_log_id, table_name, row_count, content_hash
             FROM edge_sync_table WHERE edge_sync_log_id = ?1 ORDER BY id ASC",
        )
        .bind(log_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
