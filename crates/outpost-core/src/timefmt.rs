//! # Canonical Timestamp Rendering
//!
//! Every `createdAt` that feeds a content hash serializes through this
//! module: RFC 3339, UTC, exactly microsecond precision, `Z` suffix.
//!
//! ## Why fixed precision
//! The edge verifies by re-reading rows out of its store and hashing the
//! re-serialized result. Stores are free to normalize timestamp precision
//! on the way in, so a hash over store-native rendering would diverge from
//! the hash the central side computed over the same logical rows. Pinning
//! the rendered precision makes the two byte sequences identical whenever
//! the instants are identical.

use chrono::{DateTime, SecondsFormat, Utc};

/// Renders a timestamp in the canonical wire/hash format.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use outpost_core::timefmt;
///
/// let dt = Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap();
/// assert_eq!(timefmt::format(&dt), "2026-08-05T09:30:00.000000Z");
/// ```
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde `with` module: canonical RFC 3339 microsecond rendering.
pub mod rfc3339_micros {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
