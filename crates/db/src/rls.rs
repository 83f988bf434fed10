//! Tenant-scoped transactions.
//!
//! Every ledger operation runs inside a [`ScopedTransaction`]. On
//! `PostgreSQL` it sets `app.current_company_id` with `SET LOCAL`, so the
//! row-level-security policies from the migration apply for the lifetime of
//! the transaction. Other backends (`SQLite` in tests) have no RLS and rely
//! on the explicit company/branch filters every repository query carries.

use larder_shared::types::{BranchScope, CompanyId};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, TransactionTrait,
};

/// A transaction bound to one verified company/branch scope.
///
/// Dropping it without calling [`commit`](Self::commit) rolls back.
pub struct ScopedTransaction {
    txn: DatabaseTransaction,
}

impl ScopedTransaction {
    /// Begins a transaction and sets the RLS context for `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn begin(db: &DatabaseConnection, scope: BranchScope) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, scope.company_id()).await?;
        Ok(Self { txn })
    }

    /// The underlying transaction.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

/// Sets the RLS context on an existing transaction. No-op off `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context<C>(txn: &C, company_id: CompanyId) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if txn.get_database_backend() != DbBackend::Postgres {
        return Ok(());
    }
    txn.execute_unprepared(&rls_statement(company_id)).await?;
    Ok(())
}

fn rls_statement(company_id: CompanyId) -> String {
    format!("SET LOCAL app.current_company_id = '{company_id}'")
}
