//! Database migration runner for the Larder inventory ledger.
//!
//! Reads `DATABASE_URL` (from the environment or `.env`).
//!
//! Usage:
//!   migrator up      - Apply the inventory ledger schema
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop all tables and re-apply

use larder_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
