//! # Canonical Content Hashing
//!
//! Deterministic SHA-256 digest of a table's row set.
//!
//! ## The Canonical Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      hash_rows(&[T]) pipeline                           │
//! │                                                                         │
//! │  rows (already in ascending-primary-key order, caller's job)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serde_json::to_vec(&rows)                                             │
//! │  • one compact JSON array, no whitespace                               │
//! │  • camelCase field names (serde renames on the row types)              │
//! │  • struct declaration order = field order                              │
//! │  • timestamps rendered by timefmt (fixed microsecond precision)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SHA-256 ──► lowercase hex (64 chars)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The function is pure and holds no state across calls. It is invoked once
//! per table on the central side (over the scoped row set) and once per
//! table on the edge side (over the re-read row set); equality of the two
//! outputs is the protocol's verification criterion.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreResult;

/// Computes the canonical content hash of an ordered row set.
///
/// Row order is part of the hashed content: callers pass rows in ascending
/// primary key order. The empty slice is valid and hashes the two bytes
/// `[]`.
pub fn hash_rows<T: Serialize>(rows: &[T]) -> CoreResult<String> {
    let bytes = serde_json::to_vec(rows)?;
    Ok(hash_bytes(&bytes))
}

/// SHA-256 over raw bytes, rendered as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

// =============================================================================
// Unit Tests
// =============================================================================
