//! # Demo Data Seeder
//!
//! Creates (or migrates) a database file and fills it with demo data.
//!
//! ## Usage
//! ```bash
//! # Seed ./billmaster.db
//! cargo run -p billmaster-db --bin seed
//!
//! # Another file, reproducible data
//! cargo run -p billmaster-db --bin seed -- --db ./data/demo.db --seed 42
//! ```
//!
//! Does nothing when the database already has users. Delete the file to
//! regenerate.

use std::env;

use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use billmaster_db::seed::seed_demo_data;
use billmaster_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "./billmaster.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from(DEFAULT_DB_PATH);
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                i += 1;
                db_path = args.get(i).cloned().context("--db needs a path")?;
            }
            "--seed" | "-s" => {
                i += 1;
                let value = args.get(i).context("--seed needs a number")?;
                seed = Some(value.parse().with_context(|| format!("invalid seed '{}'", value))?);
            }
            "--help" | "-h" => {
                println!("BillMaster Pro demo data seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {})", DEFAULT_DB_PATH);
                println!("  -s, --seed <N>     RNG seed for reproducible data");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument '{}' (try --help)", other),
        }
        i += 1;
    }

    info!(path = %db_path, "Opening database");
    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open {}", db_path))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let now = chrono::Local::now().naive_local();
    let report = seed_demo_data(&db, &mut rng, now).await?;

    if report.skipped {
        info!("Database already has users; delete the file to regenerate");
    } else {
        info!(
            users = report.users,
            products = report.products,
            customers = report.customers,
            invoices = report.invoices,
            "Seed complete"
        );
    }

    db.close().await;
    Ok(())
}
