//! # Seed Data Loader
//!
//! Populates a central database with the demo fixtures for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./outpost_central.db)
//! cargo run -p outpost-central --bin seed
//!
//! # Specify database path
//! cargo run -p outpost-central --bin seed -- --db ./data/central.db
//! ```

use std::env;

use outpost_central::seed::{seed_demo_data, DEMO_DEVICE_MAC};
use outpost_central::{CentralDb, CentralDbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./outpost_central.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Outpost Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./outpost_central.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Outpost Seed Data Loader");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = CentralDb::new(CentralDbConfig::new(&db_path)).await?;
    println!("Connected, migrations applied");

    // Refuse to double-seed
    let existing = db
        .directory()
        .device_by_mac(DEMO_DEVICE_MAC)
        .await?
        .is_some();
    if existing {
        println!("Database already contains the demo device; skipping.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    seed_demo_data(&db).await?;

    println!("Seeded: 1 company, 1 location, 2 groups, 5 users, 3 areas, 1 device");
    println!("Demo device MAC: {}", DEMO_DEVICE_MAC);

    Ok(())
}
