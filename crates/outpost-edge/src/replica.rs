//! # Replica Table Primitives
//!
//! Truncate, load and re-read operations over the six replicated tables.
//! Everything here runs on the caller's connection so the processor can
//! keep the whole truncate/load/verify sequence inside one transaction.
//!
//! Ordering rules:
//! - truncation runs children before parents (reverse canonical order)
//! - loading runs parents before children (canonical order)
//! - re-reads return ascending primary key, the canonical hash order

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{EdgeError, EdgeResult};
use outpost_core::{hash_rows, timefmt, Area, Company, Device, Group, Location, ScopedRows, User, TABLE_ORDER};

// =============================================================================
// Truncate
// =============================================================================

/// Empties every replica table, children first, and resets the identity
/// sequences so a reloaded snapshot starts from a clean slate.
pub async fn truncate_all(conn: &mut SqliteConnection) -> EdgeResult<()> {
    for table in TABLE_ORDER.iter().rev().copied() {
        sqlx::query(&format!("DELETE FROM \"{table}\""))
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = ?1")
            .bind(table)
            .execute(&mut *conn)
            .await?;
        debug!(table, "Truncated table");
    }
    Ok(())
}

// =============================================================================
// Load
// =============================================================================

/// Loads the full snapshot, parents first, preserving the primary keys
/// supplied by the bundle. The edge is a passive replica; it never
/// generates its own ids for these tables.
pub async fn load_all(conn: &mut SqliteConnection, data: &ScopedRows) -> EdgeResult<()> {
    load_companies(conn, &data.companies).await?;
    load_locations(conn, &data.locations).await?;
    load_groups(conn, &data.groups).await?;
    load_users(conn, &data.users).await?;
    load_areas(conn, &data.areas).await?;
    load_devices(conn, &data.devices).await?;
    Ok(())
}

async fn load_companies(conn: &mut SqliteConnection, rows: &[Company]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(row.id)
            .bind(&row.name)
            .bind(timefmt::format(&row.created_at))
            .execute(&mut *conn)
            .await?;
    }
    debug!(count = rows.len(), "Loaded companies");
    Ok(())
}

async fn load_locations(conn: &mut SqliteConnection, rows: &[Location]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO locations (id, company_id, name, address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(row.id)
        .bind(row.company_id)
        .bind(&row.name)
        .bind(&row.address)
        .bind(timefmt::format(&row.created_at))
        .execute(&mut *conn)
        .await?;
    }
    debug!(count = rows.len(), "Loaded locations");
    Ok(())
}

async fn load_groups(conn: &mut SqliteConnection, rows: &[Group]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO \"groups\" (id, location_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(row.id)
        .bind(row.location_id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(timefmt::format(&row.created_at))
        .execute(&mut *conn)
        .await?;
    }
    debug!(count = rows.len(), "Loaded groups");
    Ok(())
}

async fn load_users(conn: &mut SqliteConnection, rows: &[User]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO users (id, group_id, name, email, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(row.id)
        .bind(row.group_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.role)
        .bind(timefmt::format(&row.created_at))
        .execute(&mut *conn)
        .await?;
    }
    debug!(count = rows.len(), "Loaded users");
    Ok(())
}

async fn load_areas(conn: &mut SqliteConnection, rows: &[Area]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO areas (id, location_id, name, kind, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(row.id)
        .bind(row.location_id)
        .bind(&row.name)
        .bind(&row.kind)
        .bind(timefmt::format(&row.created_at))
        .execute(&mut *conn)
        .await?;
    }
    debug!(count = rows.len(), "Loaded areas");
    Ok(())
}

async fn load_devices(conn: &mut SqliteConnection, rows: &[Device]) -> EdgeResult<()> {
    for row in rows {
        sqlx::query(
            "INSERT INTO devices (id, location_id, mac_address, name, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(row.id)
        .bind(row.location_id)
        .bind(&row.mac_address)
        .bind(&row.name)
        .bind(&row.model)
        .bind(timefmt::format(&row.created_at))
        .execute(&mut *conn)
        .await?;
    }
    debug!(count = rows.len(), "Loaded devices");
    Ok(())
}

// =============================================================================
// Re-read & Verify Primitives
// =============================================================================

/// Counts the rows of a replica table.
///
/// Table names are dispatched against the canonical set, never spliced
/// into SQL, so a hostile manifest cannot name its way into other tables.
pub async fn count_rows(conn: &mut SqliteConnection, table: &str) -> EdgeResult<i64> {
    let sql = match table {
        "companies" => "SELECT COUNT(*) FROM companies",
        "locations" => "SELECT COUNT(*) FROM locations",
        "groups" => "SELECT COUNT(*) FROM \"groups\"",
        "users" => "SELECT COUNT(*) FROM users",
        "areas" => "SELECT COUNT(*) FROM areas",
        "devices" => "SELECT COUNT(*) FROM devices",
        other => {
            return Err(EdgeError::TableSetMismatch(format!(
                "unknown table '{other}'"
            )))
        }
    };

    let count: i64 = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;
    Ok(count)
}

/// Re-reads a replica table in ascending primary key order and recomputes
/// its canonical content hash.
///
/// This is the edge-side call site of the shared hasher: the rows come
/// back out of the store (not out of the received bundle), so the hash
/// proves what was actually persisted.
pub async fn hash_table(conn: &mut SqliteConnection, table: &str) -> EdgeResult<String> {
    let hash = match table {
        "companies" => {
            let rows = sqlx::query_as::<_, Company>(
                "SELECT id, name, created_at FROM companies ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        "locations" => {
            let rows = sqlx::query_as::<_, Location>(
                "SELECT id, company_id, name, address, created_at
                 FROM locations ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        "groups" => {
            let rows = sqlx::query_as::<_, Group>(
                "SELECT id, location_id, name, description, created_at
                 FROM \"groups\" ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        "users" => {
            let rows = sqlx::query_as::<_, User>(
                "SELECT id, group_id, name, email, role, created_at
                 FROM users ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        "areas" => {
            let rows = sqlx::query_as::<_, Area>(
                "SELECT id, location_id, name, kind, created_at
                 FROM areas ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        "devices" => {
            let rows = sqlx::query_as::<_, Device>(
                "SELECT id, location_id, mac_address, name, model, created_at
                 FROM devices ORDER BY id ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            hash_rows(&rows)?
        }
        other => {
            return Err(EdgeError::TableSetMismatch(format!(
                "unknown table '{other}'"
            )))
        }
    };

    Ok(hash)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{EdgeDb, EdgeDbConfig};
    use chrono::{TimeZone, Utc};

    fn snapshot() -> ScopedRows {
        let created = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        ScopedRows {
            companies: vec![Company {
                id: 1,
                name: "Northwind Holdings".into(),
                created_at: created,
            }],
            locations: vec![Location {
                id: 1,
                company_id: 1,
                name: "Harborview Campus".into(),
                address: "200 Waterfront Way".into(),
                created_at: created,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_reread_hash_matches_source_hash() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();
        let data = snapshot();

        let mut tx = db.pool().begin().await.unwrap();
        load_all(&mut tx, &data).await.unwrap();

        let reread = hash_table(&mut tx, "companies").await.unwrap();
        assert_eq!(reread, hash_rows(&data.companies).unwrap());

        assert_eq!(count_rows(&mut tx, "companies").await.unwrap(), 1);
        assert_eq!(count_rows(&mut tx, "users").await.unwrap(), 0);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_truncate_empties_every_table() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        load_all(&mut tx, &snapshot()).await.unwrap();
        truncate_all(&mut tx).await.unwrap();

        for table in TABLE_ORDER {
            assert_eq!(count_rows(&mut tx, table).await.unwrap(), 0);
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_table_is_rejected() {
        let db = EdgeDb::new(EdgeDbConfig::in_memory()).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = count_rows(&mut conn, "sqlite_master").await.unwrap_err();
        assert!(matches!(err, EdgeError::TableSetMismatch(_)));
    }
}
