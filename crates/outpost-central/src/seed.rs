//! # Demo Fixtures
//!
//! Deterministic seed data for development and tests: one company with one
//! location, two groups, five users, three areas and a single registered
//! edge device. The fixed timestamps keep content hashes stable across
//! runs, which makes test failures reproducible.

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::error::CentralResult;
use crate::pool::CentralDb;
use outpost_core::{Area, Company, Device, Group, Location, User};

/// MAC address of the demo device.
pub const DEMO_DEVICE_MAC: &str = "48:b0:2d:e9:c3:b7";

fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
}

/// Seeds the demo dataset into an empty central store.
pub async fn seed_demo_data(db: &CentralDb) -> CentralResult<()> {
    let directory = db.directory();
    let created = created();

    directory
        .insert_company(&Company {
            id: 1,
            name: "Northwind Holdings".into(),
            created_at: created,
        })
        .await?;

    directory
        .insert_location(&Location {
            id: 1,
            company_id: 1,
            name: "Harborview Campus".into(),
            address: "200 Waterfront Way".into(),
            created_at: created,
        })
        .await?;

    for group in [
        Group {
            id: 1,
            location_id: 1,
            name: "Operations".into(),
            description: "Day-to-day site operations".into(),
            created_at: created,
        },
        Group {
            id: 2,
            location_id: 1,
            name: "Security".into(),
            description: "Access control and patrols".into(),
            created_at: created,
        },
    ] {
        directory.insert_group(&group).await?;
    }

    let users = [
        (1, 1, "Ava Lindqvist", "ava.lindqvist@northwind.example", "manager"),
        (2, 1, "Noah Okafor", "noah.okafor@northwind.example", "technician"),
        (3, 1, "Mia Castellanos", "mia.castellanos@northwind.example", "technician"),
        (4, 2, "Elias Brandt", "elias.brandt@northwind.example", "guard"),
        (5, 2, "Priya Raman", "priya.raman@northwind.example", "supervisor"),
    ];
    for (id, group_id, name, email, role) in users {
        directory
            .insert_user(&User {
                id,
                group_id,
                name: name.into(),
                email: email.into(),
                role: role.into(),
                created_at: created,
            })
            .await?;
    }

    let areas = [
        (1, "Main Lobby", "entrance"),
        (2, "Loading Dock", "logistics"),
        (3, "Server Room", "restricted"),
    ];
    for (id, name, kind) in areas {
        directory
            .insert_area(&Area {
                id,
                location_id: 1,
                name: name.into(),
                kind: kind.into(),
                created_at: created,
            })
            .await?;
    }

    directory
        .insert_device(&Device {
            id: 1,
            location_id: 1,
            mac_address: DEMO_DEVICE_MAC.into(),
            name: "Gate Controller".into(),
            model: "OP-200".into(),
            created_at: created,
        })
        .await?;

    info!("Demo data seeded");
    Ok(())
}
