//! # Wire Contract
//!
//! The three payloads that cross the network, exactly as they serialize.
//!
//! ## Exchange Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Exchange                                    │
//! │                                                                         │
//! │  edge ───► POST /device-sync/request   SyncRequest { mac }             │
//! │  edge ◄─── 200                         SyncBundle { manifest, data }   │
//! │                                                                         │
//! │        (edge truncates, loads, verifies, commits or rolls back)        │
//! │                                                                         │
//! │  edge ───► POST /device-sync/ack       SyncAcknowledgment { ... }      │
//! │  edge ◄─── 200                         (recorded, never reacted to)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Maps are `BTreeMap` so acknowledgment JSON renders in a deterministic
//! key order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entity::ScopedRows;
use crate::manifest::Manifest;

/// Body of `POST /device-sync/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Device MAC address: six two-hex-digit octets separated by `:` or
    /// `-`, case-insensitive.
    pub mac: String,
}

/// Response of `POST /device-sync/request`: the manifest plus the scoped
/// data it describes, keyed identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBundle {
    pub manifest: Manifest,
    pub data: ScopedRows,
}

/// Outcome of one edge sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    Success,
    Failed,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::Success => write!(f, "Success"),
            SyncOutcome::Failed => write!(f, "Failed"),
        }
    }
}

/// Body of `POST /device-sync/ack`: the edge's report of what it did with
/// one manifest. Recorded verbatim by the central side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAcknowledgment {
    pub manifest_id: String,
    pub mac: String,
    pub status: SyncOutcome,

    /// Row counts per table as the edge reports them.
    pub local_counts: BTreeMap<String, i64>,

    /// Content hashes per table as the edge reports them.
    pub local_checksums: BTreeMap<String, String>,

    /// Wall-clock duration of the whole attempt, non-negative.
    pub duration_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_as_pascal_case_string() {
        assert_eq!(serde_json::to_value(SyncOutcome::Success).unwrap(), "Success");
        assert_eq!(serde_json::to_value(SyncOutcome::Failed).unwrap(), "Failed");
        assert_eq!(SyncOutcome::Success.to_string(), "Success");
    }

    #[test]
    fn test_ack_wire_shape() {
        let ack = SyncAcknowledgment {
            manifest_id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".into(),
            mac: "48:b0:2d:e9:c3:b7".into(),
            status: SyncOutcome::Success,
            local_counts: BTreeMap::from([("companies".to_string(), 1)]),
            local_checksums: BTreeMap::from([("companies".to_string(), "ab".repeat(32))]),
            duration_ms: 240,
            error: None,
        };

        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["manifestId"], "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert_eq!(json["status"], "Success");
        assert_eq!(json["localCounts"]["companies"], 1);
        assert_eq!(json["durationMs"], 240);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_ack_error_field_is_optional_on_parse() {
        let json = r#"{
            "manifestId": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "mac": "48:b0:2d:e9:c3:b7",
            "status": "Failed",
            "localCounts": {},
            "localChecksums": {},
            "durationMs": 10
        }"#;

        let ack: SyncAcknowledgment = serde_json::from_str(json).unwrap();
        assert_eq!(ack.status, SyncOutcome::Failed);
        assert_eq!(ack.error, None);
    }

    #[test]
    fn test_request_parses_from_wire() {
        let request: SyncRequest = serde_json::from_str(r#"{"mac":"48-B0-2D-E9-C3-B7"}"#).unwrap();
        assert_eq!(request.mac, "48-B0-2D-E9-C3-B7");
    }
}
