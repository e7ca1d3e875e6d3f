//! # outpost-central: Central Store & Sync Orchestration
//!
//! The central half of the sync protocol: the authoritative directory
//! database, scope resolution, manifest orchestration and the append-only
//! audit trail.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     RequestSync(deviceMac)                              │
//! │                                                                         │
//! │  generate manifest ULID (used by success AND failure audit trails)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  look up device by MAC ──── not found ──► Failed audit row,            │
//! │       │                                   DeviceNotFound               │
//! │       ▼                                                                 │
//! │  resolve scope (company, location, groups, users, areas, device)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build manifest (row counts + content hashes, canonical order)         │
//! │       │                                                                 │
//! │       ├── any failure ──► Failed audit row with reason, Processing     │
//! │       ▼                                                                 │
//! │  Success audit row + one sync_manifests row per table                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return { manifest, data }                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each call opens its own unit of work against the shared store; no
//! in-memory state is shared across concurrent requests.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Directory and audit repositories
//! - [`scope`] - Per-device scope resolution
//! - [`orchestrator`] - RequestSync / AcknowledgeSync
//! - [`seed`] - Deterministic demo fixtures
//! - [`error`] - Central error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod orchestrator;
pub mod pool;
pub mod repository;
pub mod scope;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CentralError, CentralResult};
pub use orchestrator::SyncOrchestrator;
pub use pool::{CentralDb, CentralDbConfig};
pub use repository::audit::AuditRepository;
pub use repository::directory::DirectoryRepository;
pub use scope::ScopeResolver;
