//! # Sync Audit Repository
//!
//! Append-only history of the sync protocol as seen from the central side:
//! one row per request, one row per table of every generated manifest, one
//! row per acknowledgment received. Historical record only - verification
//! never reads these tables.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::CentralResult;
use outpost_core::{timefmt, Manifest, SyncAcknowledgment, SyncOutcome};

// =============================================================================
// Audit Row Types
// =============================================================================

/// One `sync_requests` row: the fate of a single RequestSync call.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRequestRecord {
    pub id: i64,
    pub mac: String,
    pub manifest_id: String,
    pub requested_at: DateTime<Utc>,
    pub status: String,
    pub reason: Option<String>,
}

/// One `sync_manifests` row: a table's declared count and hash at
/// generation time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManifestTableRecord {
    pub manifest_id: String,
    pub generated_at: DateTime<Utc>,
    pub table_name: String,
    pub row_count: i64,
    pub content_hash: String,
    pub filter_desc: String,
}

/// One `sync_acknowledgements` row: an edge's report, stored verbatim with
/// the reported counts and hashes as opaque JSON text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AcknowledgmentRecord {
    pub id: i64,
    pub manifest_id: String,
    pub mac: String,
    pub completed_at: DateTime<Utc>,
    pub result: String,
    pub duration_ms: i64,
    pub device_counts_json: String,
    pub device_hashes_json: String,
    pub error_text: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the sync audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    // =========================================================================
    // Writes (append-only)
    // =========================================================================

    /// Records the outcome of one sync request.
    pub async fn record_request(
        &self,
        mac: &str,
        manifest_id: &str,
        status: SyncOutcome,
        reason: Option<&str>,
    ) -> CentralResult<()> {
        debug!(mac = %mac, manifest_id = %manifest_id, status = %status, "Recording sync request");

        sqlx::query(
            "INSERT INTO sync_requests (mac, manifest_id, requested_at, status, reason)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(mac)
        .bind(manifest_id)
        .bind(timefmt::format(&Utc::now()))
        .bind(status.to_string())
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records one row per table of a generated manifest.
    pub async fn record_table_manifests(&self, manifest: &Manifest) -> CentralResult<()> {
        let filter_desc = format!("locationId: {}", manifest.filters.location_id);

        for table in &manifest.tables {
            sqlx::query(
                "INSERT INTO sync_manifests
                     (manifest_id, generated_at, table_name, row_count, content_hash, filter_desc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&manifest.id)
            .bind(timefmt::format(&manifest.generated_at))
            .bind(&table.name)
            .bind(table.row_count)
            .bind(&table.content_hash)
            .bind(&filter_desc)
            .execute(&self.pool)
            .await?;
        }

        debug!(
            manifest_id = %manifest.id,
            tables = manifest.tables.len(),
            "Recorded table manifests"
        );
        Ok(())
    }

    /// Records an acknowledgment verbatim. Fire-and-forget from the
    /// orchestrator's perspective - nothing reacts to the reported status.
    pub async fn record_acknowledgment(&self, ack: &SyncAcknowledgment) -> CentralResult<()> {
        debug!(
            manifest_id = %ack.manifest_id,
            mac = %ack.mac,
            status = %ack.status,
            "Recording acknowledgment"
        );

        sqlx::query(
            "INSERT INTO sync_acknowledgements
                 (manifest_id, mac, completed_at, result, duration_ms,
                  device_counts_json, device_hashes_json, error_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&ack.manifest_id)
        .bind(&ack.mac)
        .bind(timefmt::format(&Utc::now()))
        .bind(ack.status.to_string())
        .bind(ack.duration_ms)
        .bind(serde_json::to_string(&ack.local_counts)?)
        .bind(serde_json::to_string(&ack.local_checksums)?)
        .bind(ack.error.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reads (observability and tests)
    // =========================================================================

    /// Request history for one device, newest first.
    pub async fn requests_for_mac(&self, mac: &str) -> CentralResult<Vec<SyncRequestRecord>> {
        let rows = sqlx::query_as::<_, SyncRequestRecord>(
            "SELECT id, mac, manifest_id, requested_at, status, reason
             FROM sync_requests WHERE mac = ?1
             ORDER BY id DESC",
        )
        .bind(mac)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The per-table audit rows of one manifest, in insertion order.
    pub async fn tables_for_manifest(
        &self,
        manifest_id: &str,
    ) -> CentralResult<Vec<ManifestTableRecord>> {
        let rows = sqlx::query_as::<_, ManifestTableRecord>(
            "SELECT manifest_id, generated_at, table_name, row_count, content_hash, filter_desc
             FROM sync_manifests WHERE manifest_id = ?1
             ORDER BY rowid ASC",
        )
        .bind(manifest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Acknowledgments received for one manifest, oldest first.
    pub async fn acknowledgments_for_manifest(
        &self,
        manifest_id: &str,
    ) -> CentralResult<Vec<AcknowledgmentRecord>> {
        let rows = sqlx::query_as::<_, AcknowledgmentRecord>(
            "SELECT id, manifest_id, mac, completed_at, result, duration_ms,
                    device_counts_json, device_hashes_json, error_text
             FROM sync_acknowledgements WHERE manifest_id = ?1
             ORDER BY id ASC",
        )
        .bind(manifest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
