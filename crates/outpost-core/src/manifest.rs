//! # Manifest Construction
//!
//! A manifest describes one synchronization snapshot: per-table row counts
//! and content hashes plus identity, versioning and expiry metadata. The
//! central side builds it; the edge side verifies against it after loading.
//!
//! ## Canonical Table Order
//! Tables appear in a fixed parent-before-child order, defined once here
//! and never derived from a data structure's incidental iteration order:
//! companies → locations → groups → users → areas → devices.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ulid::Ulid;

use crate::entity::ScopedRows;
use crate::error::CoreResult;
use crate::hash::hash_rows;
use crate::timefmt;

/// Protocol schema version. Bumped whenever the table set or row shape
/// changes; an edge refuses to apply a manifest whose version it does not
/// understand.
pub const SCHEMA_VERSION: i32 = 1;

/// Manifest time-to-live. An edge must reject a manifest whose expiry has
/// passed before applying it.
pub const MANIFEST_TTL_SECS: i64 = 3600;

/// Canonical table order: parents before children. Truncation on the edge
/// runs this in reverse.
pub const TABLE_ORDER: [&str; 6] = [
    "companies",
    "locations",
    "groups",
    "users",
    "areas",
    "devices",
];

// =============================================================================
// Manifest Types
// =============================================================================

/// Per-table entry: the two independent checks the edge performs after
/// loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableManifest {
    /// Canonical table name, unique within a manifest.
    pub name: String,

    /// Number of rows in the scoped snapshot.
    pub row_count: i64,

    /// Canonical content hash (lowercase hex SHA-256) of the row set.
    pub content_hash: String,
}

/// Descriptive record of the scope applied, for audit only. The edge never
/// uses this for verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFilters {
    pub location_id: i64,
}

/// One synchronization snapshot descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// ULID: 26 characters, lexicographically sortable, time-ordered.
    /// Generated once per request, never reused.
    pub id: String,

    #[serde(with = "timefmt::rfc3339_micros")]
    pub generated_at: DateTime<Utc>,

    pub schema_version: i32,

    /// One entry per synced table, in canonical table order.
    pub tables: Vec<TableManifest>,

    #[serde(with = "timefmt::rfc3339_micros")]
    pub expires_at: DateTime<Utc>,

    pub filters: ScopeFilters,
}

impl Manifest {
    /// True once the expiry deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Declared row counts keyed by table name, as reported back in
    /// acknowledgments.
    pub fn declared_counts(&self) -> BTreeMap<String, i64> {
        self.tables
            .iter()
            .map(|t| (t.name.clone(), t.row_count))
            .collect()
    }

    /// Declared content hashes keyed by table name.
    pub fn declared_checksums(&self) -> BTreeMap<String, String> {
        self.tables
            .iter()
            .map(|t| (t.name.clone(), t.content_hash.clone()))
            .collect()
    }
}

// =============================================================================
// Construction
// =============================================================================

/// Generates a fresh manifest identifier.
///
/// ULIDs are collision-resistant without coordination, so concurrent
/// requests for the same device still get independent identifiers.
pub fn new_manifest_id() -> String {
    Ulid::new().to_string()
}

/// Builds a manifest over an already scope-filtered row set.
///
/// Pure function of its input: for each table in canonical order, compute
/// row count and content hash; stamp identity, version and a one-hour
/// expiry. An empty table yields `row_count = 0` and the hash of an empty
/// sequence, which is valid and round-trips.
pub fn build_manifest(
    id: impl Into<String>,
    rows: &ScopedRows,
    location_id: i64,
    generated_at: DateTime<Utc>,
) -> CoreResult<Manifest> {
    let tables = vec![
        table_entry("companies", &rows.companies)?,
        table_entry("locations", &rows.locations)?,
        table_entry("groups", &rows.groups)?,
        table_entry("users", &rows.users)?,
        table_entry("areas", &rows.areas)?,
        table_entry("devices", &rows.devices)?,
    ];

    Ok(Manifest {
        id: id.into(),
        generated_at,
        schema_version: SCHEMA_VERSION,
        tables,
        expires_at: generated_at + Duration::seconds(MANIFEST_TTL_SECS),
        filters: ScopeFilters { location_id },
    })
}

fn table_entry<T: serde::Serialize>(name: &str, rows: &[T]) -> CoreResult<TableManifest> {
    Ok(TableManifest {
        name: name.to_string(),
        row_count: rows.len() as i64,
        content_hash: hash_rows(rows)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Company, Location};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap()
    }

    fn sample_rows() -> ScopedRows {
        let created = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        ScopedRows {
            companies: vec![Company {
                id: 1,
                name: "Acme".into(),
                created_at: created,
            }],
            locations: vec![Location {
                id: 1,
                company_id: 1,
                name: "HQ".into(),
                address: "1 Main St".into(),
                created_at: created,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_manifest_id_is_26_char_ulid() {
        let id = new_manifest_id();
        assert_eq!(id.len(), 26);
        assert!(id.parse::<Ulid>().is_ok());
    }

    #[test]
    fn test_tables_follow_canonical_order() {
        let manifest = build_manifest(new_manifest_id(), &sample_rows(), 1, now()).unwrap();

        let names: Vec<&str> = manifest.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TABLE_ORDER.to_vec());
    }

    #[test]
    fn test_counts_and_expiry() {
        let generated = now();
        let manifest = build_manifest("01ARZ3NDEKTSV4RRFFQ69G5FAV", &sample_rows(), 1, generated)
            .unwrap();

        assert_eq!(manifest.schema_version, SCHEMA_VERSION);
        assert_eq!(manifest.tables[0].row_count, 1); // companies
        assert_eq!(manifest.tables[2].row_count, 0); // groups (empty)
        assert_eq!(
            manifest.expires_at,
            generated + Duration::seconds(MANIFEST_TTL_SECS)
        );
        assert!(!manifest.is_expired(generated));
        assert!(manifest.is_expired(generated + Duration::seconds(MANIFEST_TTL_SECS + 1)));
    }

    #[test]
    fn test_empty_snapshot_round_trips() {
        let empty = ScopedRows::default();
        let manifest = build_manifest(new_manifest_id(), &empty, 1, now()).unwrap();

        for table in &manifest.tables {
            assert_eq!(table.row_count, 0);
            assert_eq!(table.content_hash, crate::hash::hash_bytes(b"[]"));
        }
    }

    #[test]
    fn test_rebuild_over_same_rows_matches_table_for_table() {
        let rows = sample_rows();
        let first = build_manifest("a", &rows, 1, now()).unwrap();
        let second = build_manifest("b", &rows, 1, now()).unwrap();

        // Identity differs; the verified content does not.
        assert_eq!(first.tables, second.tables);
    }

    #[test]
    fn test_declared_maps_cover_all_tables() {
        let manifest = build_manifest(new_manifest_id(), &sample_rows(), 1, now()).unwrap();

        let counts = manifest.declared_counts();
        let checksums = manifest.declared_checksums();
        for table in TABLE_ORDER {
            assert!(counts.contains_key(table));
            assert!(checksums.contains_key(table));
        }
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let manifest = build_manifest("01ARZ3NDEKTSV4RRFFQ69G5FAV", &sample_rows(), 7, now())
            .unwrap();

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["id"], "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert!(json["generatedAt"].is_string());
        assert!(json["expiresAt"].is_string());
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["filters"]["locationId"], 7);
        assert_eq!(json["tables"][0]["name"], "companies");
        assert!(json["tables"][0]["rowCount"].is_number());
        assert!(json["tables"][0]["contentHash"].is_string());
    }
}
