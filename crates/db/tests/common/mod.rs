//! Shared fixtures for repository integration tests.
//!
//! Each test gets its own in-memory `SQLite` database migrated with the real
//! `Migrator`. The pool holds a single connection so the database lives as
//! long as the test and concurrent callers queue on it.
//!
//! Tests that need real row locks use [`setup_postgres`] instead, which
//! connects to `LARDER__DATABASE__URL` and skips when it is unset.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use larder_core::posting::{
    ConsumptionInput, ConsumptionLine, CostInfo, ReceiptInput, ReceiptLine, SourceRef, SourceType,
};
use larder_core::stock::{ItemKey, OrderingPolicy};
use larder_db::migration::{Migrator, MigratorTrait};
use larder_db::{AccountRepository, DocumentRepository};
use larder_shared::config::DatabaseConfig;
use larder_shared::types::{BranchId, BranchScope, CompanyId, Quantity, UnitCost, UserId};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::Mutex;
use uuid::Uuid;

static POSTGRES_MIGRATED: Mutex<bool> = Mutex::const_new(false);

/// Connects to a fresh migrated database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// Connects a multi-connection pool to the `PostgreSQL` database named by
/// `LARDER__DATABASE__URL`, migrating it once per test binary.
///
/// Returns `None` when the variable is unset, names another backend, or the
/// database cannot be reached. Every caller works in a fresh company, so runs
/// never see each other's rows.
pub async fn setup_postgres() -> Option<DatabaseConnection> {
    let url = match std::env::var("LARDER__DATABASE__URL") {
        Ok(url) if url.starts_with("postgres") => url,
        _ => {
            eprintln!("Skipping test - LARDER__DATABASE__URL does not name a PostgreSQL database");
            return None;
        }
    };
    let config = DatabaseConfig {
        url,
        max_connections: 8,
        min_connections: 1,
    };
    let db = match larder_db::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };

    let mut migrated = POSTGRES_MIGRATED.lock().await;
    if !*migrated {
        Migrator::up(&db, None).await.expect("Failed to migrate");
        *migrated = true;
    }
    Some(db)
}

/// A fresh company/branch/actor with the ledger accounts seeded.
pub async fn setup_scope(db: &DatabaseConnection) -> BranchScope {
    let scope = BranchScope::verified(CompanyId::new(), BranchId::new(), UserId::new());
    AccountRepository::new(db.clone())
        .seed_defaults(scope.company_id())
        .await
        .expect("Failed to seed accounts");
    scope
}

/// Another branch of the same company.
pub fn sibling_branch(scope: &BranchScope) -> BranchScope {
    BranchScope::verified(scope.company_id(), BranchId::new(), scope.actor_id())
}

pub fn qty(value: Decimal) -> Quantity {
    Quantity::new(value)
}

pub fn cost(value: Decimal) -> CostInfo {
    CostInfo::new(UnitCost::new(value), "IDR").expect("valid cost")
}

pub fn flour() -> ItemKey {
    ItemKey::new("Flour", "kg").expect("valid key")
}

pub fn sugar() -> ItemKey {
    ItemKey::new("Sugar", "kg").expect("valid key")
}

/// Midnight UTC on day `n` of January 2026.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::days(n - 1)
}

/// Registers and submits a document.
pub async fn submitted(
    db: &DatabaseConnection,
    scope: &BranchScope,
    source_type: SourceType,
) -> SourceRef {
    let source = SourceRef::new(source_type, Uuid::new_v4());
    let documents = DocumentRepository::new(db.clone());
    documents.register(scope, source).await.expect("register");
    documents.submit(scope, source).await.expect("submit");
    source
}

/// Registers a document and leaves it in draft.
pub async fn draft(
    db: &DatabaseConnection,
    scope: &BranchScope,
    source_type: SourceType,
) -> SourceRef {
    let source = SourceRef::new(source_type, Uuid::new_v4());
    DocumentRepository::new(db.clone())
        .register(scope, source)
        .await
        .expect("register");
    source
}

pub fn receipt_line(item: ItemKey, quantity: Decimal, unit_cost: Decimal) -> ReceiptLine {
    ReceiptLine {
        item,
        qty: qty(quantity),
        cost: cost(unit_cost),
        expiry_date: None,
        expected_qty: None,
        line_ref: None,
    }
}

pub fn receipt(source: SourceRef, received_at: DateTime<Utc>, lines: Vec<ReceiptLine>) -> ReceiptInput {
    ReceiptInput {
        source,
        received_at,
        lines,
    }
}

pub fn consumption_line(item: ItemKey, quantity: Decimal) -> ConsumptionLine {
    ConsumptionLine {
        item,
        qty: qty(quantity),
        expected_qty: None,
        preferred_lot: None,
    }
}

pub fn consumption(source: SourceRef, lines: Vec<ConsumptionLine>) -> ConsumptionInput {
    ConsumptionInput {
        source,
        policy: OrderingPolicy::ReceiptOrder,
        lines,
    }
}
