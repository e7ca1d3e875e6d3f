//! # Validation Module
//!
//! Boundary validation for the wire contract. Rejections here are
//! `ValidationError`s and never reach business logic or the audit trail.
//!
//! ## Usage
//! ```rust
//! use outpost_core::validation::normalize_mac;
//!
//! let mac = normalize_mac("48-B0-2D-E9-C3-B7").unwrap();
//! assert_eq!(mac, "48:b0:2d:e9:c3:b7");
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::wire::SyncAcknowledgment;

// =============================================================================
// MAC Addresses
// =============================================================================

/// Validates and normalizes a device MAC address.
///
/// ## Rules
/// - Six two-hex-digit octets
/// - Separated by `:` or `-` (mixed separators are accepted)
/// - Case-insensitive
///
/// ## Returns
/// The normalized form: lowercase, colon-separated. Lookups and audit rows
/// use this form so every device has exactly one spelling.
pub fn normalize_mac(raw: &str) -> ValidationResult<String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required("mac"));
    }

    let octets: Vec<&str> = raw.split(['-', ':']).collect();
    if octets.len() != 6
        || octets
            .iter()
            .any(|o| o.len() != 2 || !o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(ValidationError::invalid_format(
            "mac",
            "expected six two-hex-digit octets, e.g. 48:b0:2d:e9:c3:b7",
        ));
    }

    Ok(octets
        .iter()
        .map(|o| o.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(":"))
}

// =============================================================================
// Manifest Identifiers
// =============================================================================

/// Crockford base32 alphabet used by ULIDs (I, L, O, U excluded).
const ULID_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Validates a manifest identifier: 26 characters of Crockford base32,
/// case-insensitive.
pub fn validate_manifest_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("manifestId"));
    }

    if id.len() != 26
        || !id
            .chars()
            .all(|c| ULID_ALPHABET.contains(c.to_ascii_uppercase()))
    {
        return Err(ValidationError::invalid_format(
            "manifestId",
            "must be a 26-character ULID",
        ));
    }

    Ok(())
}

// =============================================================================
// Acknowledgments
// =============================================================================

/// Structural validation of an acknowledgment body.
///
/// The status and the count/checksum maps are enforced by the type itself;
/// what remains is the identifier formats and the duration range.
pub fn validate_acknowledgment(ack: &SyncAcknowledgment) -> ValidationResult<()> {
    validate_manifest_id(&ack.manifest_id)?;
    normalize_mac(&ack.mac)?;

    if ack.duration_ms < 0 {
        return Err(ValidationError::OutOfRange {
            field: "durationMs".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SyncOutcome;
    use std::collections::BTreeMap;

    #[test]
    fn test_normalize_mac_accepts_both_separators() {
        assert_eq!(
            normalize_mac("48:b0:2d:e9:c3:b7").unwrap(),
            "48:b0:2d:e9:c3:b7"
        );
        assert_eq!(
            normalize_mac("48-B0-2D-E9-C3-B7").unwrap(),
            "48:b0:2d:e9:c3:b7"
        );
        assert_eq!(
            normalize_mac("00:00:00:00:00:00").unwrap(),
            "00:00:00:00:00:00"
        );
    }

    #[test]
    fn test_normalize_mac_rejects_malformed_input() {
        assert!(normalize_mac("").is_err());
        assert!(normalize_mac("   ").is_err());
        assert!(normalize_mac("48:b0:2d:e9:c3").is_err()); // five octets
        assert!(normalize_mac("48:b0:2d:e9:c3:b7:aa").is_err()); // seven
        assert!(normalize_mac("48:b0:2d:e9:c3:g7").is_err()); // non-hex
        assert!(normalize_mac("48b02de9c3b7").is_err()); // no separators
        assert!(normalize_mac("4:b0:2d:e9:c3:b7").is_err()); // short octet
    }

    #[test]
    fn test_validate_manifest_id() {
        assert!(validate_manifest_id("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_ok());
        assert!(validate_manifest_id("01arz3ndektsv4rrffq69g5fav").is_ok());

        assert!(validate_manifest_id("").is_err());
        assert!(validate_manifest_id("too-short").is_err());
        assert!(validate_manifest_id("01ARZ3NDEKTSV4RRFFQ69G5FAL").is_err()); // L excluded
        assert!(validate_manifest_id("01ARZ3NDEKTSV4RRFFQ69G5FA").is_err()); // 25 chars
    }

    #[test]
    fn test_validate_acknowledgment() {
        let mut ack = SyncAcknowledgment {
            manifest_id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".into(),
            mac: "48:b0:2d:e9:c3:b7".into(),
            status: SyncOutcome::Success,
            local_counts: BTreeMap::new(),
            local_checksums: BTreeMap::new(),
            duration_ms: 0,
            error: None,
        };
        assert!(validate_acknowledgment(&ack).is_ok());

        ack.duration_ms = -1;
        assert!(validate_acknowledgment(&ack).is_err());

        ack.duration_ms = 5;
        ack.mac = "not-a-mac".into();
        assert!(validate_acknowledgment(&ack).is_err());

        ack.mac = "48:b0:2d:e9:c3:b7".into();
        ack.manifest_id = "nope".into();
        assert!(validate_acknowledgment(&ack).is_err());
    }
}
