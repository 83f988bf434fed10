//! Chart of accounts repository.
//!
//! The ledger only posts to the fixed codes in [`AccountCode`]. Companies get
//! them through [`AccountRepository::seed_defaults`]; a posting that finds a
//! code missing or inactive fails with `MissingAccount`.

use larder_core::StockError;
use larder_core::journal::AccountCode;
use larder_shared::types::{AccountId, CompanyId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::info;

use super::convert::{db_err, now};
use crate::entities::chart_of_accounts;
use crate::rls::set_rls_context;

/// Chart of accounts repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates any of the ledger's account codes the company is missing.
    ///
    /// Existing accounts are left as they are, names included. Returns the
    /// number of accounts created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn seed_defaults(&self, company_id: CompanyId) -> Result<u64, StockError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        set_rls_context(&txn, company_id).await.map_err(db_err)?;

        let mut created = 0;
        for code in AccountCode::ALL {
            let row = chart_of_accounts::ActiveModel {
                id: Set(AccountId::new().into_inner()),
                company_id: Set(company_id.into_inner()),
                code: Set(code.code().to_string()),
                name: Set(code.default_name().to_string()),
                is_active: Set(true),
                created_at: Set(now()),
            };
            created += chart_of_accounts::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        chart_of_accounts::Column::CompanyId,
                        chart_of_accounts::Column::Code,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;

        if created > 0 {
            info!(company_id = %company_id, created, "Default accounts seeded");
        }
        Ok(created)
    }

    /// Lists the company's accounts by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<chart_of_accounts::Model>, StockError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        set_rls_context(&txn, company_id).await.map_err(db_err)?;
        let accounts = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(accounts)
    }

    /// Resolves an account code to the company's active account.
    pub(crate) async fn resolve_in<C>(
        conn: &C,
        company_id: CompanyId,
        code: AccountCode,
    ) -> Result<AccountId, StockError>
    where
        C: ConnectionTrait,
    {
        chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(chart_of_accounts::Column::Code.eq(code.code()))
            .filter(chart_of_accounts::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(|account| AccountId::from(account.id))
            .ok_or(StockError::MissingAccount { code: code.code() })
    }
}
