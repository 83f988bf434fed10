//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the inventory ledger
//! - A portable migration (`PostgreSQL` in production, `SQLite` in tests)
//! - Repositories that run the `larder-core` rules inside locked transactions

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    AccountRepository, DocumentRepository, IdempotencyGuard, InventoryRepository,
    JournalRepository, JournalWithLines, PostingRepository, StockDocument, StockItem, VoidResult,
};
pub use rls::ScopedTransaction;

use larder_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
