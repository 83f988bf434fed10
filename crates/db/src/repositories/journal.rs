//! Accounting journal repository.
//!
//! Journals are derived from the movements a posting wrote, persisted once
//! per source document and never edited afterwards. Voiding writes a
//! reversing journal and flags the original.

use std::collections::BTreeMap;

use larder_core::StockError;
use larder_core::journal::{
    AccountCode, JournalBuilder, JournalDraft, JournalLineDraft, PostedMovement, ReversalService,
};
use larder_core::posting::{DocumentWorkflow, SourceRef, SourceType};
use larder_core::stock::Movement;
use larder_shared::types::{AccountId, BranchScope, JournalId, JournalLineId, LotId, MovementId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::account::AccountRepository;
use super::convert::{amount, db_err, now};
use super::document::DocumentRepository;
use super::inventory::InventoryRepository;
use crate::entities::sea_orm_active_enums::{JournalState, SourceKind};
use crate::entities::{accounting_journal_lines, accounting_journals};
use crate::rls::ScopedTransaction;

/// A journal header with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalWithLines {
    /// Journal header.
    pub journal: accounting_journals::Model,
    /// Lines by `line_no`.
    pub lines: Vec<accounting_journal_lines::Model>,
    /// False when an existing journal was returned.
    pub created: bool,
}

impl JournalWithLines {
    /// Journal ID.
    #[must_use]
    pub fn id(&self) -> JournalId {
        self.journal.id.into()
    }
}

/// Outcome of voiding a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidResult {
    /// The original journal, now `VOIDED`.
    pub original: JournalWithLines,
    /// The reversing journal.
    pub reversal: JournalWithLines,
}

/// Accounting journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates the journal for a posted document, or returns the existing one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the document is unknown in this branch
    /// - `InvalidState` if the document is not `POSTED` or `DISCREPANCY`
    /// - `NonPostable` if its movements carry no value
    /// - `MissingAccount` if a required account code is not configured
    pub async fn generate_journal(
        &self,
        scope: &BranchScope,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<JournalWithLines, StockError> {
        let source = SourceRef::new(source_type, source_id);
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();

        let document = DocumentRepository::lock_in(txn, scope, &source).await?;
        if let Some(existing) = Self::find_in(txn, scope, &source).await? {
            stx.commit().await.map_err(db_err)?;
            debug!(source = %source, journal_id = %existing.journal.id, "Journal already exists");
            return Ok(existing);
        }
        DocumentWorkflow::ensure_journal_allowed(&source, document.status.into())?;

        let movements = InventoryRepository::movements_for_source_in(txn, scope, &source).await?;
        let posted: Vec<PostedMovement> = movements.iter().map(PostedMovement::from).collect();
        let draft = JournalBuilder::derive(&source, &posted)?;
        let journal = Self::persist_draft_in(txn, scope, &draft, None).await?;
        stx.commit().await.map_err(db_err)?;

        info!(
            source = %source,
            journal_id = %journal.journal.id,
            total = %draft.totals.debit,
            "Journal generated"
        );
        Ok(journal)
    }

    /// Finds the journal for a source document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_journal(
        &self,
        scope: &BranchScope,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<JournalWithLines>, StockError> {
        let source = SourceRef::new(source_type, source_id);
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let journal = Self::find_in(stx.transaction(), scope, &source).await?;
        stx.commit().await.map_err(db_err)?;
        Ok(journal)
    }

    /// Gets a journal by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the journal is not in the caller's branch.
    pub async fn get_journal(
        &self,
        scope: &BranchScope,
        journal_id: JournalId,
    ) -> Result<JournalWithLines, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        let journal = Self::journal_query(scope)
            .filter(accounting_journals::Column::Id.eq(journal_id.into_inner()))
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("journal", journal_id))?;
        let lines = Self::lines_in(txn, journal.id).await?;
        stx.commit().await.map_err(db_err)?;
        Ok(JournalWithLines {
            journal,
            lines,
            created: false,
        })
    }

    /// Voids a posted journal by writing its reversal.
    ///
    /// The reversal swaps every line's side, uses `JOURNAL_REVERSAL` with the
    /// original's ID as its source, and records `reversal_of`. The original is
    /// flagged `VOIDED`; its amounts and lines are left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the journal is not in the caller's branch
    /// - `InvalidState` if it is already voided or is itself a reversal
    /// - `InvalidInput` if `reason` is blank
    pub async fn void_journal(
        &self,
        scope: &BranchScope,
        journal_id: JournalId,
        reason: &str,
    ) -> Result<VoidResult, StockError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(StockError::InvalidInput(
                "a void reason is required".to_string(),
            ));
        }

        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();

        let original = Self::journal_query(scope)
            .filter(accounting_journals::Column::Id.eq(journal_id.into_inner()))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("journal", journal_id))?;
        ReversalService::ensure_voidable(
            journal_id,
            original.status.into(),
            original.reversal_of.is_some(),
        )?;

        let lines = Self::lines_in(txn, original.id).await?;
        let drafts = lines
            .iter()
            .map(line_draft)
            .collect::<Result<Vec<_>, _>>()?;
        let draft = ReversalService::reverse(journal_id, &drafts, reason)?;
        let reversal = Self::persist_draft_in(txn, scope, &draft, Some(journal_id)).await?;

        let mut active: accounting_journals::ActiveModel = original.into();
        active.status = Set(JournalState::Voided);
        active.void_reason = Set(Some(reason.to_string()));
        active.voided_at = Set(Some(now()));
        active.voided_by = Set(Some(scope.actor_id().into_inner()));
        let voided = active.update(txn).await.map_err(db_err)?;
        stx.commit().await.map_err(db_err)?;

        info!(
            journal_id = %journal_id,
            reversal_id = %reversal.journal.id,
            actor = %scope.actor_id(),
            reason,
            "Journal voided"
        );
        Ok(VoidResult {
            original: JournalWithLines {
                journal: voided,
                lines,
                created: false,
            },
            reversal,
        })
    }

    // ========== In-transaction helpers ==========

    /// Derives and persists the journal for movements just written.
    ///
    /// A zero-valued posting has nothing to journal: it is logged and `None`
    /// is returned so the stock side still commits.
    pub(crate) async fn derive_and_persist_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
        movements: &[Movement],
    ) -> Result<Option<JournalWithLines>, StockError>
    where
        C: ConnectionTrait,
    {
        if let Some(existing) = Self::find_in(conn, scope, source).await? {
            return Ok(Some(existing));
        }

        let posted: Vec<PostedMovement> = movements.iter().map(PostedMovement::from).collect();
        match JournalBuilder::derive(source, &posted) {
            Ok(draft) => Self::persist_draft_in(conn, scope, &draft, None).await.map(Some),
            Err(StockError::NonPostable { total }) => {
                warn!(source = %source, total = %total, "Zero-value posting, journal skipped");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Finds the journal for a source in the caller's branch.
    pub(crate) async fn find_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<Option<JournalWithLines>, StockError>
    where
        C: ConnectionTrait,
    {
        let Some(journal) = Self::journal_query(scope)
            .filter(accounting_journals::Column::SourceType.eq(SourceKind::from(source.source_type)))
            .filter(accounting_journals::Column::SourceId.eq(source.source_id))
            .one(conn)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let lines = Self::lines_in(conn, journal.id).await?;
        Ok(Some(JournalWithLines {
            journal,
            lines,
            created: false,
        }))
    }

    async fn persist_draft_in<C>(
        conn: &C,
        scope: &BranchScope,
        draft: &JournalDraft,
        reversal_of: Option<JournalId>,
    ) -> Result<JournalWithLines, StockError>
    where
        C: ConnectionTrait,
    {
        let company_id = scope.company_id();
        let mut accounts: BTreeMap<AccountCode, AccountId> = BTreeMap::new();
        for line in &draft.lines {
            if !accounts.contains_key(&line.account) {
                let id = AccountRepository::resolve_in(conn, company_id, line.account).await?;
                accounts.insert(line.account, id);
            }
        }

        let at = now();
        let journal = accounting_journals::ActiveModel {
            id: Set(JournalId::new().into_inner()),
            company_id: Set(company_id.into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            source_type: Set(draft.source.source_type.into()),
            source_id: Set(draft.source.source_id),
            status: Set(JournalState::Posted),
            memo: Set(draft.memo.clone()),
            total_debit: Set(draft.totals.debit.to_string()),
            total_credit: Set(draft.totals.credit.to_string()),
            reversal_of: Set(reversal_of.map(JournalId::into_inner)),
            void_reason: Set(None),
            voided_at: Set(None),
            voided_by: Set(None),
            created_by: Set(scope.actor_id().into_inner()),
            created_at: Set(at),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for (line_no, line) in (1_i32..).zip(&draft.lines) {
            let account_id = accounts
                .get(&line.account)
                .copied()
                .ok_or(StockError::MissingAccount {
                    code: line.account.code(),
                })?;
            let model = accounting_journal_lines::ActiveModel {
                id: Set(JournalLineId::new().into_inner()),
                journal_id: Set(journal.id),
                company_id: Set(company_id.into_inner()),
                line_no: Set(line_no),
                account_id: Set(account_id.into_inner()),
                account_code: Set(line.account.code().to_string()),
                side: Set(line.side.into()),
                amount: Set(line.amount.to_string()),
                lot_id: Set(line.lot_id.map(LotId::into_inner)),
                movement_id: Set(line.movement_id.map(MovementId::into_inner)),
                memo: Set(line.memo.clone()),
                created_at: Set(at),
            }
            .insert(conn)
            .await
            .map_err(db_err)?;
            lines.push(model);
        }

        debug!(
            journal_id = %journal.id,
            source = %draft.source,
            lines = lines.len(),
            "Journal persisted"
        );
        Ok(JournalWithLines {
            journal,
            lines,
            created: true,
        })
    }

    async fn lines_in<C>(
        conn: &C,
        journal_id: Uuid,
    ) -> Result<Vec<accounting_journal_lines::Model>, StockError>
    where
        C: ConnectionTrait,
    {
        accounting_journal_lines::Entity::find()
            .filter(accounting_journal_lines::Column::JournalId.eq(journal_id))
            .order_by_asc(accounting_journal_lines::Column::LineNo)
            .all(conn)
            .await
            .map_err(db_err)
    }

    fn journal_query(scope: &BranchScope) -> Select<accounting_journals::Entity> {
        accounting_journals::Entity::find()
            .filter(accounting_journals::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(accounting_journals::Column::BranchId.eq(scope.branch_id().into_inner()))
    }
}

/// Rebuilds the draft form of a stored line, for reversal.
fn line_draft(line: &accounting_journal_lines::Model) -> Result<JournalLineDraft, StockError> {
    let account = line
        .account_code
        .parse::<AccountCode>()
        .map_err(StockError::Internal)?;
    Ok(JournalLineDraft {
        account,
        side: line.side.into(),
        amount: amount(&line.amount)?,
        lot_id: line.lot_id.map(LotId::from),
        movement_id: line.movement_id.map(MovementId::from),
        memo: line.memo.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::LineSide;
    use larder_core::journal::EntrySide;

    fn stored_line(code: &str, side: LineSide) -> accounting_journal_lines::Model {
        accounting_journal_lines::Model {
            id: Uuid::new_v4(),
            journal_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            line_no: 1,
            account_id: Uuid::new_v4(),
            account_code: code.to_string(),
            side,
            amount: "12.500".to_string(),
            lot_id: Some(Uuid::new_v4()),
            movement_id: None,
            memo: "RECEIPT".to_string(),
            created_at: now(),
        }
    }

    #[test]
    fn test_line_draft_restores_stored_line() {
        let stored = stored_line("5100", LineSide::Debit);
        let draft = line_draft(&stored).unwrap();
        assert_eq!(draft.account, AccountCode::CostOfGoodsSold);
        assert_eq!(draft.side, EntrySide::Debit);
        assert_eq!(draft.amount.to_string(), "12.500");
        assert_eq!(draft.lot_id.map(LotId::into_inner), stored.lot_id);
    }

    #[test]
    fn test_line_draft_rejects_unknown_account() {
        let err = line_draft(&stored_line("9999", LineSide::Credit)).unwrap_err();
        assert!(err.is_fatal());
    }
}
