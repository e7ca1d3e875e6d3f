//! Repository implementations for the central store.
//!
//! - [`directory`] - the authoritative business rows (companies through
//!   devices): lookups, scoped queries, inserts for seeding
//! - [`audit`] - the append-only sync audit trail

pub mod audit;
pub mod directory;
