//! # outpost-edge: Edge Replica Store & Sync Worker
//!
//! The edge half of the sync protocol. A single periodic worker requests a
//! manifest+data bundle, hands it to the processor, and reports the
//! outcome back to the central API.
//!
//! ## Processing Pipeline (the correctness-critical path)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ProcessSync(bundle)                               │
//! │                                                                         │
//! │  refuse early: expired manifest / unknown schema / table-set mismatch  │
//! │       │ (tables untouched; refusal logged as a Failed attempt)         │
//! │       ▼                                                                 │
//! │  edge_sync_log row: InProgress                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────── ONE TRANSACTION ─────────────────────────────┐   │
//! │  │ truncate devices → areas → users → groups → locations →         │   │
//! │  │          companies (children first, sequences reset)            │   │
//! │  │ load companies → locations → groups → users → areas → devices   │   │
//! │  │          (parents first, primary keys preserved)                │   │
//! │  │ verify every table: re-read, recount, re-hash, compare          │   │
//! │  └──────────────┬─────────────────────────────┬────────────────────┘   │
//! │                 │ all match                   │ any mismatch           │
//! │                 ▼                             ▼                        │
//! │              COMMIT                       ROLLBACK                     │
//! │   log Success + per-table rows      log Failed (one message per       │
//! │   update last_manifest_id           mismatching table, concatenated)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A concurrent reader would see either the prior complete snapshot or the
//! new complete snapshot, never an intermediate state. At most one
//! ProcessSync executes at a time - the worker loop is sequential.
//!
//! ## Module Organization
//!
//! - [`pool`] - Replica database pool and configuration
//! - [`migrations`] - Embedded edge migrations
//! - [`replica`] - Truncate / load / re-read primitives
//! - [`log`] - Sync attempt log, per-table results, durable state marker
//! - [`processor`] - The atomic load-and-verify transaction
//! - [`client`] - HTTP client for the central API
//! - [`worker`] - Periodic sync loop
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Edge error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod log;
pub mod migrations;
pub mod pool;
pub mod processor;
pub mod replica;
pub mod worker;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::CentralClient;
pub use config::EdgeConfig;
pub use error::{EdgeError, EdgeResult};
pub use pool::{EdgeDb, EdgeDbConfig};
pub use processor::SyncProcessor;
pub use worker::{SyncWorker, SyncWorkerHandle};
