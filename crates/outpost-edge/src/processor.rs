//! # Edge Sync Processor
//!
//! Atomically replaces the local replica tables with a bundle's data and
//! verifies the result against the manifest. The whole truncate/load/
//! verify sequence executes inside one transaction: either the prior
//! complete snapshot or the new complete snapshot is ever visible, never
//! an intermediate state.
//!
//! Verification re-reads the rows out of the store rather than hashing
//! the received bytes - the hash then proves what was actually persisted,
//! and the canonical timestamp rendering keeps store round-trips
//! byte-stable.

use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::{EdgeError, EdgeResult};
use crate::log::TableCheck;
use crate::pool::EdgeDb;
use crate::replica;
use outpost_core::{timefmt, Manifest, SyncBundle, SCHEMA_VERSION, TABLE_ORDER};

/// The edge-side load-and-verify engine.
#[derive(Debug, Clone)]
pub struct SyncProcessor {
    db: EdgeDb,
}

impl SyncProcessor {
    /// Creates a new processor over the edge database.
    pub fn new(db: EdgeDb) -> Self {
        SyncProcessor { db }
    }

    /// Applies one bundle.
    ///
    /// On any refusal or verification mismatch the replica keeps exactly
    /// the data it had before the call, the attempt is logged as Failed,
    /// and the error is returned for the worker to acknowledge.
    pub async fn process(&self, bundle: &SyncBundle) -> EdgeResult<()> {
        let manifest = &bundle.manifest;
        let started = Instant::now();
        let log = self.db.sync_log();

        info!(
            manifest_id = %manifest.id,
            schema_version = manifest.schema_version,
            "Starting sync processing"
        );

        // Refusals: nothing has touched the replica tables yet, but the
        // attempt still lands in the log - it is the complete sync history.
        if let Err(err) = check_bundle(manifest) {
            warn!(manifest_id = %manifest.id, %err, "Refusing bundle");
            let log_id = log.open_attempt(&manifest.id).await?;
            log.mark_failed(log_id, elapsed_ms(started), &err.to_string())
                .await?;
            return Err(err);
        }

        let log_id = log.open_attempt(&manifest.id).await?;

        match self.apply(bundle).await {
            Ok(checks) => {
                log.record_tables(log_id, &checks).await?;
                log.mark_success(log_id, elapsed_ms(started)).await?;
                log.set_last_manifest(&manifest.id).await?;

                info!(
                    manifest_id = %manifest.id,
                    duration_ms = elapsed_ms(started),
                    "Sync processed successfully"
                );
                Ok(())
            }
            Err(err) => {
                error!(manifest_id = %manifest.id, %err, "Sync processing failed");
                log.mark_failed(log_id, elapsed_ms(started), &err.to_string())
                    .await?;
                Err(err)
            }
        }
    }

    /// The transactional section: truncate, load, verify, then commit or
    /// roll back. Returns the recomputed per-table results on success.
    async fn apply(&self, bundle: &SyncBundle) -> EdgeResult<Vec<TableCheck>> {
        let manifest = &bundle.manifest;

        let mut tx = self.db.pool().begin().await?;

        replica::truncate_all(&mut tx).await?;
        replica::load_all(&mut tx, &bundle.data).await?;

        // Verify every table against the manifest. Counts and hashes are
        // recomputed from the just-loaded, committed-but-not-finalized
        // state; all mismatches are collected before deciding.
        let mut checks = Vec::with_capacity(manifest.tables.len());
        let mut mismatches = Vec::new();

        for table in &manifest.tables {
            let actual_count = replica::count_rows(&mut tx, &table.name).await?;
            let actual_hash = replica::hash_table(&mut tx, &table.name).await?;

            if actual_count != table.row_count {
                mismatches.push(format!(
                    "Row count mismatch for {}: expected {}, got {}",
                    table.name, table.row_count, actual_count
                ));
            }
            if actual_hash != table.content_hash {
                mismatches.push(format!(
                    "Hash mismatch for {}: expected {}, got {}",
                    table.name, table.content_hash, actual_hash
                ));
            }

            checks.push(TableCheck {
                table_name: table.name.clone(),
                row_count: actual_count,
                content_hash: actual_hash,
            });
        }

        if !mismatches.is_empty() {
            tx.rollback().await?;
            return Err(EdgeError::VerificationFailed(mismatches.join("; ")));
        }

        tx.commit().await?;
        Ok(checks)
    }

    /// Reads the durable marker of the most recently applied manifest.
    pub async fn last_applied_manifest(&self) -> EdgeResult<Option<String>> {
        self.db.sync_log().last_manifest_id().await
    }
}

/// Pre-transaction refusal checks: expiry, schema version, table set.
fn check_bundle(manifest: &Manifest) -> EdgeResult<()> {
    if manifest.is_expired(Utc::now()) {
        return Err(EdgeError::ManifestExpired {
            manifest_id: manifest.id.clone(),
            expires_at: timefmt::format(&manifest.expires_at),
        });
    }

    if manifest.schema_version != SCHEMA_VERSION {
        return Err(EdgeError::UnsupportedSchemaVersion {
            expected: SCHEMA_VERSION,
            actual: manifest.schema_version,
        });
    }

    let names: Vec<&str> = manifest.tables.iter().map(|t| t.name.as_str()).collect();
    if names != TABLE_ORDER {
        return Err(EdgeError::TableSetMismatch(format!(
            "expected {:?}, got {:?}",
            TABLE_ORDER, names
        )));
    }

    Ok(())
}

fn elapsed_ms(started: Instant) -> i64 {
    started.elapsed().as_millis() as i64
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{EdgeDb, EdgeDbConfig};
    use chrono::{Duration, TimeZone, Utc};
    use outpost_core::{
        build_manifest, new_manifest_id, Company, Device, Location, ScopedRows, SyncBundle,
    };

    fn sample_rows() -> ScopedRows {
        let created = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        ScopedRows {
            companies: vec![Company {
                id: 1,
                name: "Northwind Holdings".into(),
                created_at: created,
            }],
            locations: vec![Location {
                id: 1,
                company_id: 1,
                name: "Harborview Campus".into(),
                address: "200 Waterfront Way".into(),
                created_at: created,
            }],
            devices: vec![Device {
                id: 1,
                location_id: 1,
                mac_address: "48:b0:2d:e9:c3:b7".into(),
                name: "Gate Controller".into(),
                model: "OP-200".into(),
                created_at: created,
            }],
            ..Default::default()
        }
    }

    fn bundle_over(rows: ScopedRows) -> SyncBundle {
        let manifest = build_manifest(new_manifest_id(), &rows, 1, Utc::now()).unwrap();
        SyncBundle {
            manifest,
            data: rows,
        }
    }

    async fn edge() -> (EdgeDb, SyncProcessor) {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();
        (db.clone(), SyncProcessor::new(db))
    }

    #[tokio::test]
    async fn test_successful_apply_commits_and_logs() {
        let (db, processor) = edge().await;
        let bundle = bundle_over(sample_rows());

        processor.process(&bundle).await.unwrap();

        let attempt = db.sync_log().latest_attempt().await.unwrap().unwrap();
        assert_eq!(attempt.status, "Success");
        assert_eq!(attempt.manifest_id, bundle.manifest.id);

        let tables = db.sync_log().tables_for_attempt(attempt.id).await.unwrap();
        assert_eq!(tables.len(), 6);
        let devices = tables.iter().find(|t| t.table_name == "devices").unwrap();
        assert_eq!(devices.row_count, 1);
    }

    #[tokio::test]
    async fn test_constraint_violation_surfaces_as_failed_attempt() {
        let (db, processor) = edge().await;

        // A device pointing at a location the bundle does not carry.
        let mut rows = sample_rows();
        rows.locations.clear();
        let bundle = bundle_over(rows);

        let err = processor.process(&bundle).await.unwrap_err();
        assert!(matches!(err, EdgeError::Database(_)));

        let attempt = db.sync_log().latest_attempt().await.unwrap().unwrap();
        assert_eq!(attempt.status, "Failed");

        // The rolled-back load left nothing behind.
        let mut conn = db.pool().acquire().await.unwrap();
        for table in TABLE_ORDER {
            assert_eq!(crate::replica::count_rows(&mut conn, table).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_expired_manifest_is_refused_before_any_load() {
        let (db, processor) = edge().await;

        let mut bundle = bundle_over(ScopedRows::default());
        bundle.manifest.generated_at = Utc::now() - Duration::hours(3);
        bundle.manifest.expires_at = Utc::now() - Duration::hours(2);

        let err = processor.process(&bundle).await.unwrap_err();
        assert!(matches!(err, EdgeError::ManifestExpired { .. }));

        // Logged as a Failed attempt, tables untouched (still empty).
        let attempt = db.sync_log().latest_attempt().await.unwrap().unwrap();
        assert_eq!(attempt.status, "Failed");
        assert!(attempt
            .error_text
            .as_deref()
            .unwrap_or_default()
            .contains("expired"));
    }

    #[tokio::test]
    async fn test_unknown_schema_version_is_refused() {
        let (_db, processor) = edge().await;

        let mut bundle = bundle_over(ScopedRows::default());
        bundle.manifest.schema_version = 99;

        let err = processor.process(&bundle).await.unwrap_err();
        assert!(matches!(err, EdgeError::UnsupportedSchemaVersion { actual: 99, .. }));
    }

    #[tokio::test]
    async fn test_table_set_mismatch_is_refused() {
        let (_db, processor) = edge().await;

        let mut bundle = bundle_over(ScopedRows::default());
        bundle.manifest.tables.remove(0);

        let err = processor.process(&bundle).await.unwrap_err();
        assert!(matches!(err, EdgeError::TableSetMismatch(_)));
    }

    #[tokio::test]
    async fn test_empty_snapshot_round_trips() {
        let (db, processor) = edge().await;
        let bundle = bundle_over(ScopedRows::default());

        processor.process(&bundle).await.unwrap();

        let attempt = db.sync_log().latest_attempt().await.unwrap().unwrap();
        assert_eq!(attempt.status, "Success");

        let tables = db.sync_log().tables_for_attempt(attempt.id).await.unwrap();
        assert_eq!(tables.len(), 6);
        assert!(tables.iter().all(|t| t.row_count == 0));

        assert_eq!(
            processor.last_applied_manifest().await.unwrap(),
            Some(bundle.manifest.id.clone())
        );
    }
}
