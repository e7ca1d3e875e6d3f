//! # Directory Repository
//!
//! Queries over the authoritative business rows. Every scoped query
//! returns rows in ascending primary key order - the canonical row order
//! the content hashes are computed over. The ordering lives here, at the
//! caller of the hasher, not inside the hasher.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::CentralResult;
use outpost_core::{timefmt, Area, Company, Device, Group, Location, User};

/// Repository for the authoritative directory tables.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Creates a new DirectoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Finds a device by its normalized MAC address.
    pub async fn device_by_mac(&self, mac: &str) -> CentralResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>(
            "SELECT id, location_id, mac_address, name, model, created_at
             FROM devices WHERE mac_address = ?1",
        )
        .bind(mac)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    /// Loads a location row by id.
    pub async fn location_by_id(&self, location_id: i64) -> CentralResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, company_id, name, address, created_at
             FROM locations WHERE id = ?1",
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    // =========================================================================
    // Scoped Queries (ascending primary key, always)
    // =========================================================================

    /// The company owning the given location, as a one-row set.
    pub async fn companies_for_location(&self, location_id: i64) -> CentralResult<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT c.id, c.name, c.created_at
             FROM companies c
             JOIN locations l ON l.company_id = c.id
             WHERE l.id = ?1
             ORDER BY c.id ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    /// The location itself, as a one-row set.
    pub async fn locations_by_id(&self, location_id: i64) -> CentralResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, company_id, name, address, created_at
             FROM locations WHERE id = ?1
             ORDER BY id ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// All groups at a location.
    pub async fn groups_at_location(&self, location_id: i64) -> CentralResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, location_id, name, description, created_at
             FROM \"groups\" WHERE location_id = ?1
             ORDER BY id ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// All users in any group at a location.
    pub async fn users_at_location(&self, location_id: i64) -> CentralResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.group_id, u.name, u.email, u.role, u.created_at
             FROM users u
             JOIN \"groups\" g ON g.id = u.group_id
             WHERE g.location_id = ?1
             ORDER BY u.id ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// All areas at a location.
    pub async fn areas_at_location(&self, location_id: i64) -> CentralResult<Vec<Area>> {
        let areas = sqlx::query_as::<_, Area>(
            "SELECT id, location_id, name, kind, created_at
             FROM areas WHERE location_id = ?1
             ORDER BY id ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(areas)
    }

    /// The requesting device itself, as a one-row set.
    pub async fn devices_by_id(&self, device_id: i64) -> CentralResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(
            "SELECT id, location_id, mac_address, name, model, created_at
             FROM devices WHERE id = ?1
             ORDER BY id ASC",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    // =========================================================================
    // Inserts (seeding and tests)
    // =========================================================================

    /// Inserts a company row.
    pub async fn insert_company(&self, company: &Company) -> CentralResult<()> {
        debug!(id = company.id, "Inserting company");
        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(company.id)
            .bind(&company.name)
            .bind(timefmt::format(&company.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a location row.
    pub async fn insert_location(&self, location: &Location) -> CentralResult<()> {
        debug!(id = location.id, "Inserting location");
        sqlx::query(
            "INSERT INTO locations (id, company_id, name, address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(location.id)
        .bind(location.company_id)
        .bind(&location.name)
        .bind(&location.address)
        .bind(timefmt::format(&location.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a group row.
    pub async fn insert_group(&self, group: &Group) -> CentralResult<()> {
        debug!(id = group.id, "Inserting group");
        sqlx::query(
            "INSERT INTO \"groups\" (id, location_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(group.id)
        .bind(group.location_id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(timefmt::format(&group.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a user row.
    pub async fn insert_user(&self, user: &User) -> CentralResult<()> {
        debug!(id = user.id, "Inserting user");
        sqlx::query(
            "INSERT INTO users (id, group_id, name, email, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(user.id)
        .bind(user.group_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(timefmt::format(&user.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts an area row.
    pub async fn insert_area(&self, area: &Area) -> CentralResult<()> {
        debug!(id = area.id, "Inserting area");
        sqlx::query(
            "INSERT INTO areas (id, location_id, name, kind, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(area.id)
        .bind(area.location_id)
        .bind(&area.name)
        .bind(&area.kind)
        .bind(timefmt::format(&area.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a device row.
    pub async fn insert_device(&self, device: &Device) -> CentralResult<()> {
        debug!(id = device.id, mac = %device.mac_address, "Inserting device");
        sqlx::query(
            "INSERT INTO devices (id, location_id, mac_address, name, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(device.id)
        .bind(device.location_id)
        .bind(&device.mac_address)
        .bind(&device.name)
        .bind(&device.model)
        .bind(timefmt::format(&device.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{CentralDb, CentralDbConfig};
    use crate::seed;

    #[tokio::test]
    async fn test_device_lookup_by_mac() {
        let db = CentralDb::new(CentralDbConfig::in_memory()).await.unwrap();
        seed::seed_demo_data(&db).await.unwrap();

        let directory = db.directory();
        let device = directory
            .device_by_mac(seed::DEMO_DEVICE_MAC)
            .await
            .unwrap()
            .expect("seeded device");
        assert_eq!(device.location_id, 1);

        let missing = directory.device_by_mac("00:00:00:00:00:00").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_scoped_queries_are_ordered_by_id() {
        let db = CentralDb::new(CentralDbConfig::in_memory()).await.unwrap();
        seed::seed_demo_data(&db).await.unwrap();

        let directory = db.directory();
        let users = directory.users_at_location(1).await.unwrap();
        assert_eq!(users.len(), 5);

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
