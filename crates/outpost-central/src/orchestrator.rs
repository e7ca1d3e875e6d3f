//! # Sync Orchestrator
//!
//! Drives one RequestSync call end to end: resolve device, resolve scope,
//! build manifest, persist the audit trail, return the bundle. Also
//! persists acknowledgment reports from edges.
//!
//! ## Failure Policy
//! The manifest identifier is generated first so both success and failure
//! leave a traceable audit row under the same id. Central failures are
//! converted to audit rows plus a typed error; they are never retried
//! here - the edge retries on its own cadence.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{CentralError, CentralResult};
use crate::pool::CentralDb;
use crate::scope::ScopeResolver;
use outpost_core::validation::{normalize_mac, validate_acknowledgment};
use outpost_core::{build_manifest, new_manifest_id, Device, SyncAcknowledgment, SyncBundle, SyncOutcome};

/// Central-side orchestration of the sync protocol.
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    db: CentralDb,
}

impl SyncOrchestrator {
    /// Creates a new orchestrator over the central database.
    pub fn new(db: CentralDb) -> Self {
        SyncOrchestrator { db }
    }

    /// Handles `POST /device-sync/request`.
    ///
    /// Unknown MAC → `DeviceNotFound` plus a Failed audit row. Any failure
    /// while resolving scope or building the manifest → `Processing` plus a
    /// Failed audit row carrying the failure message as reason.
    pub async fn request_sync(&self, raw_mac: &str) -> CentralResult<SyncBundle> {
        let mac = normalize_mac(raw_mac)?;
        let manifest_id = new_manifest_id();

        info!(mac = %mac, manifest_id = %manifest_id, "Processing sync request");

        let audit = self.db.audit();

        let Some(device) = self.db.directory().device_by_mac(&mac).await? else {
            warn!(mac = %mac, "Device not found");
            audit
                .record_request(&mac, &manifest_id, SyncOutcome::Failed, Some("device not found"))
                .await?;
            return Err(CentralError::DeviceNotFound { mac });
        };

        match self.build_bundle(&device, &manifest_id).await {
            Ok(bundle) => {
                audit
                    .record_request(&mac, &manifest_id, SyncOutcome::Success, None)
                    .await?;
                audit.record_table_manifests(&bundle.manifest).await?;

                info!(
                    mac = %mac,
                    manifest_id = %manifest_id,
                    tables = bundle.manifest.tables.len(),
                    total_rows = bundle.data.total_rows(),
                    "Built sync bundle"
                );
                Ok(bundle)
            }
            Err(err) => {
                error!(mac = %mac, manifest_id = %manifest_id, %err, "Sync request failed");
                let reason = err.to_string();
                audit
                    .record_request(&mac, &manifest_id, SyncOutcome::Failed, Some(&reason))
                    .await?;
                Err(CentralError::Processing(reason))
            }
        }
    }

    /// Handles `POST /device-sync/ack`: structural validation, then the
    /// report is persisted verbatim. Always accepted regardless of the
    /// reported status - the orchestrator records, it does not react.
    pub async fn acknowledge_sync(&self, ack: &SyncAcknowledgment) -> CentralResult<()> {
        validate_acknowledgment(ack)?;

        info!(
            manifest_id = %ack.manifest_id,
            mac = %ack.mac,
            status = %ack.status,
            duration_ms = ack.duration_ms,
            "Processing sync acknowledgment"
        );

        self.db.audit().record_acknowledgment(ack).await
    }

    /// Scope resolution + manifest construction for a resolved device.
    async fn build_bundle(&self, device: &Device, manifest_id: &str) -> CentralResult<SyncBundle> {
        let resolver = ScopeResolver::new(self.db.directory());
        let data = resolver.resolve(device).await?;

        let manifest = build_manifest(manifest_id, &data, device.location_id, Utc::now())?;

        Ok(SyncBundle { manifest, data })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{CentralDb, CentralDbConfig};
    use crate::seed;
    use outpost_core::{TABLE_ORDER, SCHEMA_VERSION};
    use std::collections::BTreeMap;

    async fn seeded_orchestrator() -> SyncOrchestrator {
        let db = CentralDb::new(CentralDbConfig::in_memory()).await.unwrap();
        seed::seed_demo_data(&db).await.unwrap();
        SyncOrchestrator::new(db)
    }

    fn orchestrator_db(orchestrator: &SyncOrchestrator) -> &CentralDb {
        &orchestrator.db
    }

    #[tokio::test]
    async fn test_happy_path_counts_and_audit() {
        let orchestrator = seeded_orchestrator().await;

        let bundle = orchestrator
            .request_sync(seed::DEMO_DEVICE_MAC)
            .await
            .unwrap();

        let manifest = &bundle.manifest;
        assert_eq!(manifest.id.len(), 26);
        assert_eq!(manifest.schema_version, SCHEMA_VERSION);

        let names: Vec<&str> = manifest.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TABLE_ORDER.to_vec());

        let counts: Vec<i64> = manifest.tables.iter().map(|t| t.row_count).collect();
        assert_eq!(counts, vec![1, 1, 2, 5, 3, 1]);

        // Audit trail: Success request row + six table rows
        let audit = orchestrator_db(&orchestrator).audit();
        let requests = audit.requests_for_mac(seed::DEMO_DEVICE_MAC).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status, "Success");
        assert_eq!(requests[0].manifest_id, manifest.id);

        let tables = audit.tables_for_manifest(&manifest.id).await.unwrap();
        assert_eq!(tables.len(), 6);
        assert_eq!(tables[0].table_name, "companies");
        assert_eq!(tables[0].filter_desc, "locationId: 1");
    }

    #[tokio::test]
    async fn test_data_matches_manifest_hashes() {
        let orchestrator = seeded_orchestrator().await;
        let bundle = orchestrator
            .request_sync(seed::DEMO_DEVICE_MAC)
            .await
            .unwrap();

        // Recomputing over the shipped data must reproduce every hash.
        let users_hash = outpost_core::hash_rows(&bundle.data.users).unwrap();
        let declared = &bundle
            .manifest
            .tables
            .iter()
            .find(|t| t.name == "users")
            .unwrap()
            .content_hash;
        assert_eq!(&users_hash, declared);
    }

    #[tokio::test]
    async fn test_unknown_device_is_rejected_and_audited() {
        let orchestrator = seeded_orchestrator().await;

        let err = orchestrator
            .request_sync("00:00:00:00:00:00")
            .await
            .unwrap_err();
        assert!(matches!(err, CentralError::DeviceNotFound { .. }));

        let audit = orchestrator_db(&orchestrator).audit();
        let requests = audit.requests_for_mac("00:00:00:00:00:00").await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status, "Failed");
        assert_eq!(requests[0].reason.as_deref(), Some("device not found"));

        // No table manifests were written for the failed request.
        let tables = audit
            .tables_for_manifest(&requests[0].manifest_id)
            .await
            .unwrap();
        assert!(tables.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_mac_is_validation_not_audit() {
        let orchestrator = seeded_orchestrator().await;

        let err = orchestrator.request_sync("not-a-mac").await.unwrap_err();
        assert!(matches!(err, CentralError::Validation(_)));
    }

    #[tokio::test]
    async fn test_mac_lookup_is_case_and_separator_insensitive() {
        let orchestrator = seeded_orchestrator().await;

        let bundle = orchestrator.request_sync("48-B0-2D-E9-C3-B7").await.unwrap();
        assert_eq!(bundle.data.devices[0].mac_address, seed::DEMO_DEVICE_MAC);
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_independent_manifests() {
        let orchestrator = seeded_orchestrator().await;

        let first = orchestrator.request_sync(seed::DEMO_DEVICE_MAC).await.unwrap();
        let second = orchestrator.request_sync(seed::DEMO_DEVICE_MAC).await.unwrap();

        assert_ne!(first.manifest.id, second.manifest.id);
        assert_eq!(first.manifest.tables, second.manifest.tables);
    }

    #[tokio::test]
    async fn test_acknowledgment_is_persisted_verbatim() {
        let orchestrator = seeded_orchestrator().await;
        let bundle = orchestrator
            .request_sync(seed::DEMO_DEVICE_MAC)
            .await
            .unwrap();

        let ack = SyncAcknowledgment {
            manifest_id: bundle.manifest.id.clone(),
            mac: seed::DEMO_DEVICE_MAC.to_string(),
            status: SyncOutcome::Failed,
            local_counts: bundle.manifest.declared_counts(),
            local_checksums: bundle.manifest.declared_checksums(),
            duration_ms: 321,
            error: Some("Hash mismatch for devices".to_string()),
        };

        orchestrator.acknowledge_sync(&ack).await.unwrap();

        let audit = orchestrator_db(&orchestrator).audit();
        let stored = audit
            .acknowledgments_for_manifest(&bundle.manifest.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].result, "Failed");
        assert_eq!(stored[0].duration_ms, 321);
        assert_eq!(
            stored[0].error_text.as_deref(),
            Some("Hash mismatch for devices")
        );

        let counts: BTreeMap<String, i64> =
            serde_json::from_str(&stored[0].device_counts_json).unwrap();
        assert_eq!(counts["users"], 5);
    }

    #[tokio::test]
    async fn test_invalid_acknowledgment_is_rejected() {
        let orchestrator = seeded_orchestrator().await;

        let ack = SyncAcknowledgment {
            manifest_id: "bogus".to_string(),
            mac: seed::DEMO_DEVICE_MAC.to_string(),
            status: SyncOutcome::Success,
            local_counts: BTreeMap::new(),
            local_checksums: BTreeMap::new(),
            duration_ms: 0,
            error: None,
        };

        let err = orchestrator.acknowledge_sync(&ack).await.unwrap_err();
        assert!(matches!(err, CentralError::Validation(_)));
    }
}
