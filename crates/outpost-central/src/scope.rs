//! # Scope Resolution
//!
//! Maps a device to the exact row set its location is authorized to
//! receive: its own company, its own location, all groups and areas at
//! that location, all users in those groups, and the device itself.
//!
//! Every table comes back in ascending primary key order - the canonical
//! row order the manifest hashes are computed over.

use tracing::info;

use crate::error::CentralResult;
use crate::repository::directory::DirectoryRepository;
use outpost_core::{Device, ScopedRows};

/// Resolves the scoped row set for a requesting device.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    directory: DirectoryRepository,
}

impl ScopeResolver {
    /// Creates a new ScopeResolver over the directory repository.
    pub fn new(directory: DirectoryRepository) -> Self {
        ScopeResolver { directory }
    }

    /// Collects the device's scoped snapshot.
    ///
    /// The device row has already been resolved by MAC; a vanished device
    /// at this point surfaces as empty row sets, which is still a valid
    /// (if useless) snapshot - existence is the orchestrator's check.
    pub async fn resolve(&self, device: &Device) -> CentralResult<ScopedRows> {
        let location_id = device.location_id;

        let scoped = ScopedRows {
            companies: self.directory.companies_for_location(location_id).await?,
            locations: self.directory.locations_by_id(location_id).await?,
            groups: self.directory.groups_at_location(location_id).await?,
            users: self.directory.users_at_location(location_id).await?,
            areas: self.directory.areas_at_location(location_id).await?,
            devices: self.directory.devices_by_id(device.id).await?,
        };

        info!(
            device_id = device.id,
            location_id,
            total_rows = scoped.total_rows(),
            "Resolved device scope"
        );

        Ok(scoped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{CentralDb, CentralDbConfig};
    use crate::seed;

    #[tokio::test]
    async fn test_scope_covers_exactly_the_device_location() {
        let db = CentralDb::new(CentralDbConfig::in_memory()).await.unwrap();
        seed::seed_demo_data(&db).await.unwrap();

        let directory = db.directory();
        let device = directory
            .device_by_mac(seed::DEMO_DEVICE_MAC)
            .await
            .unwrap()
            .expect("seeded device");

        let scoped = ScopeResolver::new(directory).resolve(&device).await.unwrap();

        assert_eq!(scoped.companies.len(), 1);
        assert_eq!(scoped.locations.len(), 1);
        assert_eq!(scoped.groups.len(), 2);
        assert_eq!(scoped.users.len(), 5);
        assert_eq!(scoped.areas.len(), 3);
        assert_eq!(scoped.devices.len(), 1);
        assert_eq!(scoped.devices[0].mac_address, seed::DEMO_DEVICE_MAC);
    }
}
