//! Idempotency guard backed by the `idempotency_records` table.
//!
//! A key is reserved by inserting an `IN_PROGRESS` row under the unique
//! `(company, actor, key, method, path)` index. Whoever inserts the row runs
//! the operation; everyone else reads the row and lets
//! [`IdempotencyPolicy`] decide between replay, conflict, in-progress and
//! reclaiming an abandoned reservation.

use std::future::Future;

use chrono::Utc;
use larder_core::idempotency::{
    Decision, GuardError, IdempotencyError, IdempotencyPolicy, IdempotentRequest,
    IdempotentResponse, RecordState, RecordView,
};
use larder_shared::config::IdempotencyConfig;
use larder_shared::types::{BranchScope, IdempotencyRecordId};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::convert::now;
use crate::entities::idempotency_records;
use crate::entities::sea_orm_active_enums::IdempotencyState;
use crate::rls::ScopedTransaction;

/// Reservation attempts before a contended key is reported as in progress.
const MAX_RESERVE_ATTEMPTS: usize = 3;

enum Reservation {
    Reserved(Uuid),
    Replay(IdempotentResponse),
}

/// Runs mutating operations at most once per idempotency key.
#[derive(Debug, Clone)]
pub struct IdempotencyGuard {
    db: DatabaseConnection,
    policy: IdempotencyPolicy,
}

impl IdempotencyGuard {
    /// Creates a guard with an explicit policy.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: IdempotencyPolicy) -> Self {
        Self { db, policy }
    }

    /// Creates a guard using the configured stale threshold.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: &IdempotencyConfig) -> Self {
        Self::new(db, IdempotencyPolicy::from_secs(config.stale_after_secs))
    }

    /// Runs `op` once for this key and stores its response.
    ///
    /// - new key: reserve, run, store the response
    /// - same key, same request, completed: return the stored response without running
    /// - same key, different request: `Conflict`
    /// - same key still running: `InProgress`, unless the reservation is
    ///   older than the stale threshold, in which case it is reclaimed
    ///
    /// If `op` fails its reservation is released so a retry can run.
    ///
    /// # Errors
    ///
    /// `GuardError::Idempotency` when the guard refuses or cannot record the
    /// request, `GuardError::Operation` when `op` itself fails.
    pub async fn execute<F, Fut, E>(
        &self,
        scope: &BranchScope,
        request: &IdempotentRequest,
        op: F,
    ) -> Result<IdempotentResponse, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IdempotentResponse, E>>,
    {
        let request_hash = request.fingerprint();
        let record_id = match self.reserve(scope, request, &request_hash).await? {
            Reservation::Reserved(id) => id,
            Reservation::Replay(response) => {
                debug!(key = %request.key, status = response.status, "Idempotent replay");
                return Ok(response);
            }
        };

        match op().await {
            Ok(response) => {
                self.complete(scope, record_id, &response).await?;
                Ok(response)
            }
            Err(err) => {
                if let Err(release_err) = self.release(scope, record_id).await {
                    warn!(
                        key = %request.key,
                        error = %release_err,
                        "Failed to release idempotency reservation"
                    );
                }
                Err(GuardError::Operation(err))
            }
        }
    }

    async fn reserve(
        &self,
        scope: &BranchScope,
        request: &IdempotentRequest,
        request_hash: &str,
    ) -> Result<Reservation, IdempotencyError> {
        for attempt in 1..=MAX_RESERVE_ATTEMPTS {
            let stx = ScopedTransaction::begin(&self.db, *scope)
                .await
                .map_err(store_err)?;
            let txn = stx.transaction();

            let record_id = IdempotencyRecordId::new().into_inner();
            let row = idempotency_records::ActiveModel {
                id: Set(record_id),
                company_id: Set(scope.company_id().into_inner()),
                actor_id: Set(scope.actor_id().into_inner()),
                idempotency_key: Set(request.key.clone()),
                method: Set(request.method.clone()),
                path: Set(request.path.clone()),
                request_hash: Set(request_hash.to_string()),
                state: Set(IdempotencyState::InProgress),
                response_status: Set(None),
                response_body: Set(None),
                created_at: Set(now()),
                completed_at: Set(None),
            };
            let inserted = idempotency_records::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        idempotency_records::Column::CompanyId,
                        idempotency_records::Column::ActorId,
                        idempotency_records::Column::IdempotencyKey,
                        idempotency_records::Column::Method,
                        idempotency_records::Column::Path,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(txn)
                .await
                .map_err(store_err)?;
            if inserted == 1 {
                stx.commit().await.map_err(store_err)?;
                debug!(key = %request.key, "Idempotency key reserved");
                return Ok(Reservation::Reserved(record_id));
            }

            let existing = idempotency_records::Entity::find()
                .filter(idempotency_records::Column::CompanyId.eq(scope.company_id().into_inner()))
                .filter(idempotency_records::Column::ActorId.eq(scope.actor_id().into_inner()))
                .filter(idempotency_records::Column::IdempotencyKey.eq(request.key.as_str()))
                .filter(idempotency_records::Column::Method.eq(request.method.as_str()))
                .filter(idempotency_records::Column::Path.eq(request.path.as_str()))
                .one(txn)
                .await
                .map_err(store_err)?;
            let Some(existing) = existing else {
                // Released between our insert and read.
                stx.commit().await.map_err(store_err)?;
                continue;
            };

            let view = record_view(&existing)?;
            match self
                .policy
                .decide(&request.key, Some(&view), request_hash, Utc::now())?
            {
                Decision::Replay(response) => {
                    stx.commit().await.map_err(store_err)?;
                    return Ok(Reservation::Replay(response));
                }
                Decision::Reclaim => {
                    warn!(
                        key = %request.key,
                        created_at = %view.created_at,
                        attempt,
                        "Reclaiming stale idempotency reservation"
                    );
                    idempotency_records::Entity::delete_many()
                        .filter(idempotency_records::Column::Id.eq(existing.id))
                        .filter(idempotency_records::Column::State.eq(IdempotencyState::InProgress))
                        .exec(txn)
                        .await
                        .map_err(store_err)?;
                    stx.commit().await.map_err(store_err)?;
                }
                Decision::Reserve => {
                    stx.commit().await.map_err(store_err)?;
                }
            }
        }

        Err(IdempotencyError::InProgress {
            key: request.key.clone(),
        })
    }

    async fn complete(
        &self,
        scope: &BranchScope,
        record_id: Uuid,
        response: &IdempotentResponse,
    ) -> Result<(), IdempotencyError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(store_err)?;
        idempotency_records::Entity::update_many()
            .col_expr(
                idempotency_records::Column::State,
                Expr::value(IdempotencyState::Completed),
            )
            .col_expr(
                idempotency_records::Column::ResponseStatus,
                Expr::value(Some(i32::from(response.status))),
            )
            .col_expr(
                idempotency_records::Column::ResponseBody,
                Expr::value(Some(response.body.clone())),
            )
            .col_expr(idempotency_records::Column::CompletedAt, Expr::value(Some(now())))
            .filter(idempotency_records::Column::Id.eq(record_id))
            .exec(stx.transaction())
            .await
            .map_err(store_err)?;
        stx.commit().await.map_err(store_err)
    }

    async fn release(&self, scope: &BranchScope, record_id: Uuid) -> Result<(), IdempotencyError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(store_err)?;
        idempotency_records::Entity::delete_many()
            .filter(idempotency_records::Column::Id.eq(record_id))
            .filter(idempotency_records::Column::State.eq(IdempotencyState::InProgress))
            .exec(stx.transaction())
            .await
            .map_err(store_err)?;
        stx.commit().await.map_err(store_err)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn store_err(err: DbErr) -> IdempotencyError {
    IdempotencyError::Database(err.to_string())
}

fn record_view(record: &idempotency_records::Model) -> Result<RecordView, IdempotencyError> {
    let state = match record.state {
        IdempotencyState::InProgress => RecordState::InProgress,
        IdempotencyState::Completed => {
            let status = record
                .response_status
                .and_then(|status| u16::try_from(status).ok())
                .ok_or_else(|| {
                    IdempotencyError::Database(format!(
                        "completed idempotency record {} has no response status",
                        record.id
                    ))
                })?;
            let body = record.response_body.clone().unwrap_or_default();
            RecordState::Completed(IdempotentResponse::new(status, body))
        }
    };
    Ok(RecordView {
        request_hash: record.request_hash.clone(),
        state,
        created_at: record.created_at.with_timezone(&Utc),
    })
}
