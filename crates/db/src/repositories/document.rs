//! Stock document repository.
//!
//! A stock document is the posting engine's record of a business document
//! (goods receipt, consumption batch, adjustment). It carries the
//! `DRAFT -> SUBMITTED -> POSTED | DISCREPANCY` state used to decide whether
//! a posting call runs or replays.

use chrono::{DateTime, Utc};
use larder_core::StockError;
use larder_core::posting::{
    DocumentStatus, DocumentTransition, DocumentWorkflow, ProjectionDelta, SourceRef,
};
use larder_shared::types::{BranchId, BranchScope, DocumentId, UserId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::convert::{db_err, now};
use crate::entities::sea_orm_active_enums::{DocumentState, SourceKind};
use crate::entities::stock_documents;
use crate::rls::ScopedTransaction;

/// A stock document as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDocument {
    /// Row ID; also the posting ID.
    pub id: DocumentId,
    /// Business document reference.
    pub source: SourceRef,
    /// Branch the document belongs to.
    pub branch_id: BranchId,
    /// Current status.
    pub status: DocumentStatus,
    /// When it was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who submitted it.
    pub submitted_by: Option<UserId>,
    /// When it was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted it.
    pub posted_by: Option<UserId>,
}

impl From<stock_documents::Model> for StockDocument {
    fn from(model: stock_documents::Model) -> Self {
        Self {
            id: model.id.into(),
            source: SourceRef::new(model.source_type.into(), model.source_id),
            branch_id: model.branch_id.into(),
            status: model.status.into(),
            submitted_at: model.submitted_at.map(|at| at.with_timezone(&Utc)),
            submitted_by: model.submitted_by.map(UserId::from),
            posted_at: model.posted_at.map(|at| at.with_timezone(&Utc)),
            posted_by: model.posted_by.map(UserId::from),
        }
    }
}

/// Stock document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a source document in `DRAFT`.
    ///
    /// Idempotent: registering an existing source returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the source is registered under another branch,
    /// or `InvalidInput` for a non-stock source type.
    pub async fn register(
        &self,
        scope: &BranchScope,
        source: SourceRef,
    ) -> Result<StockDocument, StockError> {
        if !source.source_type.is_stock_document() {
            return Err(StockError::InvalidInput(format!(
                "{} is not a stock document type",
                source.source_type
            )));
        }

        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();

        let at = now();
        let row = stock_documents::ActiveModel {
            id: Set(DocumentId::new().into_inner()),
            company_id: Set(scope.company_id().into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            source_type: Set(source.source_type.into()),
            source_id: Set(source.source_id),
            status: Set(DocumentState::Draft),
            submitted_at: Set(None),
            submitted_by: Set(None),
            posted_at: Set(None),
            posted_by: Set(None),
            projections: Set(None),
            created_at: Set(at),
            updated_at: Set(at),
        };
        stock_documents::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    stock_documents::Column::CompanyId,
                    stock_documents::Column::SourceType,
                    stock_documents::Column::SourceId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(db_err)?;

        let model = Self::find_in(txn, scope, &source)
            .await?
            .ok_or_else(|| StockError::not_found("document", source))?;
        stx.commit().await.map_err(db_err)?;

        debug!(source = %source, status = ?model.status, "Stock document registered");
        Ok(model.into())
    }

    /// Moves a document from `DRAFT` to `SUBMITTED`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the document is not a draft, or `NotFound`.
    pub async fn submit(
        &self,
        scope: &BranchScope,
        source: SourceRef,
    ) -> Result<StockDocument, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();

        let model = Self::lock_in(txn, scope, &source).await?;
        let transition = DocumentWorkflow::submit(&source, model.status.into(), scope.actor_id())?;
        let updated = Self::apply_in(txn, model, &transition, &[]).await?;
        stx.commit().await.map_err(db_err)?;

        info!(source = %source, actor = %scope.actor_id(), "Stock document submitted");
        Ok(updated.into())
    }

    /// Gets a document by source reference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the source is unknown in this branch.
    pub async fn get(
        &self,
        scope: &BranchScope,
        source: SourceRef,
    ) -> Result<StockDocument, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let model = Self::find_in(stx.transaction(), scope, &source)
            .await?
            .ok_or_else(|| StockError::not_found("document", source))?;
        stx.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    /// Finds a document in the caller's branch.
    ///
    /// A document of the same company registered under another branch is
    /// reported as absent.
    pub(crate) async fn find_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<Option<stock_documents::Model>, StockError>
    where
        C: ConnectionTrait,
    {
        let model = Self::source_query(scope, source)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(model.filter(|doc| doc.branch_id == scope.branch_id().into_inner()))
    }

    /// Locks a document row for the rest of the transaction.
    pub(crate) async fn lock_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<stock_documents::Model, StockError>
    where
        C: ConnectionTrait,
    {
        let model = Self::source_query(scope, source)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?
            .filter(|doc| doc.branch_id == scope.branch_id().into_inner())
            .ok_or_else(|| StockError::not_found("document", source))?;

        debug!(source = %source, status = ?model.status, "Stock document locked");
        Ok(model)
    }

    /// Writes a validated transition.
    pub(crate) async fn apply_in<C>(
        conn: &C,
        model: stock_documents::Model,
        transition: &DocumentTransition,
        projections: &[ProjectionDelta],
    ) -> Result<stock_documents::Model, StockError>
    where
        C: ConnectionTrait,
    {
        let at: sea_orm::prelude::DateTimeWithTimeZone = transition.at.into();
        let actor = transition.actor.into_inner();

        let mut active: stock_documents::ActiveModel = model.into();
        active.status = Set(transition.new_status.into());
        active.updated_at = Set(at);
        if transition.new_status == DocumentStatus::Submitted {
            active.submitted_at = Set(Some(at));
            active.submitted_by = Set(Some(actor));
        } else if transition.new_status.is_terminal() {
            active.posted_at = Set(Some(at));
            active.posted_by = Set(Some(actor));
            let stored = serde_json::to_value(projections).map_err(|e| {
                StockError::Internal(format!("cannot store projection deltas: {e}"))
            })?;
            active.projections = Set(Some(stored));
        }

        active.update(conn).await.map_err(db_err)
    }

    /// Projection deltas recorded when the document was posted.
    pub(crate) fn stored_projections(
        model: &stock_documents::Model,
    ) -> Result<Vec<ProjectionDelta>, StockError> {
        model.projections.clone().map_or(Ok(Vec::new()), |stored| {
            serde_json::from_value(stored).map_err(|e| {
                StockError::Internal(format!(
                    "document {} has unreadable projection deltas: {e}",
                    model.id
                ))
            })
        })
    }

    fn source_query(scope: &BranchScope, source: &SourceRef) -> Select<stock_documents::Entity> {
        stock_documents::Entity::find()
            .filter(stock_documents::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(stock_documents::Column::SourceType.eq(SourceKind::from(source.source_type)))
            .filter(stock_documents::Column::SourceId.eq(source.source_id))
    }
}
