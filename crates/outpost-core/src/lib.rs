//! # outpost-core: Pure Protocol Logic for Outpost
//!
//! This crate is the **heart** of the Outpost sync protocol. It contains
//! everything both sides of the wire must agree on, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Outpost Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────┐              ┌──────────────────────┐        │
//! │  │   central-api        │              │   edge-agent         │        │
//! │  │   (axum HTTP)        │◄── wire ────►│   (sync loop)        │        │
//! │  └──────────┬───────────┘              └──────────┬───────────┘        │
//! │             │                                     │                     │
//! │  ┌──────────▼───────────┐              ┌──────────▼───────────┐        │
//! │  │   outpost-central    │              │   outpost-edge       │        │
//! │  │   scope + audit      │              │   load + verify      │        │
//! │  └──────────┬───────────┘              └──────────┬───────────┘        │
//! │             │                                     │                     │
//! │  ┌──────────▼─────────────────────────────────────▼───────────┐        │
//! │  │               ★ outpost-core (THIS CRATE) ★                │        │
//! │  │                                                            │        │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌───────────┐ │        │
//! │  │   │  entity  │  │   hash   │  │ manifest │  │   wire    │ │        │
//! │  │   │ row types│  │  SHA-256 │  │  builder │  │   DTOs    │ │        │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └───────────┘ │        │
//! │  │                                                            │        │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │        │
//! │  └────────────────────────────────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The One Invariant That Matters
//!
//! A table's content hash must come out identical when computed over the
//! same logical row set on the central side (before sending) and on the
//! edge side (after loading). Everything that feeds the hash (field
//! casing, field order, timestamp precision, row order, table order) is
//! therefore defined exactly once, in this crate, and both sides call the
//! same code.
//!
//! ## Modules
//!
//! - [`entity`] - Replicated row types (Company, Location, ..., Device)
//! - [`timefmt`] - Canonical RFC 3339 timestamp rendering
//! - [`hash`] - Canonical SHA-256 content hashing
//! - [`manifest`] - Manifest construction and table ordering
//! - [`wire`] - Request / bundle / acknowledgment DTOs
//! - [`validation`] - MAC and acknowledgment validation
//! - [`error`] - Core error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod entity;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod timefmt;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use entity::{Area, Company, Device, Group, Location, ScopedRows, User};
pub use error::{CoreError, CoreResult, ValidationError};
pub use hash::hash_rows;
pub use manifest::{
    build_manifest, new_manifest_id, Manifest, ScopeFilters, TableManifest, MANIFEST_TTL_SECS,
    SCHEMA_VERSION, TABLE_ORDER,
};
pub use wire::{SyncAcknowledgment, SyncBundle, SyncOutcome, SyncRequest};
