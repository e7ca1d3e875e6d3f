//! # Replicated Row Types
//!
//! The six tables a device receives, shaped exactly as they travel on the
//! wire. Field declaration order IS the canonical field order for hashing;
//! serde renames define the canonical casing. Both sides of the protocol
//! use these types, which is what keeps the content hashes comparable.
//!
//! Primary keys are supplied by the central store and carried verbatim
//! through manifest, data and load. No component invents ids for these
//! rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timefmt;

/// A company. Parent of locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

/// A physical location belonging to a company. Each edge device serves
/// exactly one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub address: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

/// A user group at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

/// A user, member of exactly one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

/// A physical area within a location (room, zone, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    /// Wire name is `type`; stored as `kind` to stay clear of the keyword.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

/// An edge device. Identified on the wire by its MAC address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub location_id: i64,
    pub mac_address: String,
    pub name: String,
    pub model: String,
    #[serde(with = "timefmt::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Scoped Row Sets
// =============================================================================

/// One device's complete scoped snapshot, every table ordered by ascending
/// primary key (the scope resolver enforces the ordering, not the hasher).
///
/// Serializes directly as the bundle's `data` object: the field names are
/// the canonical table names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedRows {
    pub companies: Vec<Company>,
    pub locations: Vec<Location>,
    pub groups: Vec<Group>,
    pub users: Vec<User>,
    pub areas: Vec<Area>,
    pub devices: Vec<Device>,
}

impl ScopedRows {
    /// Row counts per table in canonical table order.
    pub fn counts(&self) -> [(&'static str, usize); 6] {
        [
            ("companies", self.companies.len()),
            ("locations", self.locations.len()),
            ("groups", self.groups.len()),
            ("users", self.users.len()),
            ("areas", self.areas.len()),
            ("devices", self.devices.len()),
        ]
    }

    /// Total rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.counts().iter().map(|(_, n)| n).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let device = Device {
            id: 7,
            location_id: 1,
            mac_address: "48:b0:2d:e9:c3:b7".into(),
            name: "Door Panel".into(),
            model: "OP-200".into(),
            created_at: created(),
        };

        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["locationId"], 1);
        assert_eq!(json["macAddress"], "48:b0:2d:e9:c3:b7");
        assert_eq!(json["createdAt"], "2026-08-05T09:30:00.000000Z");
    }

    #[test]
    fn test_area_kind_serializes_as_type() {
        let area = Area {
            id: 3,
            location_id: 1,
            name: "Lobby".into(),
            kind: "entrance".into(),
            created_at: created(),
        };

        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["type"], "entrance");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_scoped_rows_data_keys_are_table_names() {
        let json = serde_json::to_value(ScopedRows::default()).unwrap();
        for table in crate::manifest::TABLE_ORDER {
            assert!(json.get(table).is_some(), "missing key {table}");
        }
    }

    #[test]
    fn test_row_round_trips_through_wire_json() {
        let user = User {
            id: 42,
            group_id: 2,
            name: "Dana Reyes".into(),
            email: "dana@example.com".into(),
            role: "manager".into(),
            created_at: created(),
        };

        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
