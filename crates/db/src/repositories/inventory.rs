//! Inventory ledger repository.
//!
//! Owns items, lots and movements. Mutations happen only through the
//! `*_in` helpers, which run inside a caller's transaction so a posting can
//! lock, deplete and recompute in one atomic unit. The public methods open
//! their own scoped transaction.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use larder_core::StockError;
use larder_core::posting::{CostInfo, ProjectionDelta, SourceRef};
use larder_core::stock::{
    AuditReport, ItemAudit, ItemKey, LotAudit, LotSnapshot, Movement, MovementType, Projection,
};
use larder_shared::types::{
    AuditEventId, BranchId, BranchScope, ItemId, LotId, MovementId, Quantity, UnitCost,
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::convert::{db_err, lot_snapshot, movement, now, quantity, unit_cost};
use crate::entities::sea_orm_active_enums::SourceKind;
use crate::entities::{
    inventory_audit_events, inventory_items, inventory_lots, inventory_movements,
};
use crate::rls::ScopedTransaction;

/// An inventory item with its cached on-hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    /// Item ID.
    pub id: ItemId,
    /// Branch holding the item.
    pub branch_id: BranchId,
    /// Name and unit.
    pub key: ItemKey,
    /// Cached `Σ lot.remaining_qty`.
    pub on_hand: Quantity,
    /// Last projection write.
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    fn from_model(model: &inventory_items::Model) -> Result<Self, StockError> {
        Ok(Self {
            id: model.id.into(),
            branch_id: model.branch_id.into(),
            key: ItemKey {
                name: model.name.clone(),
                unit: model.unit.clone(),
            },
            on_hand: quantity(&model.on_hand)?,
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

/// Everything needed to open one lot.
#[derive(Debug, Clone)]
pub(crate) struct NewLot<'a> {
    pub item_id: ItemId,
    pub source: &'a SourceRef,
    pub source_line_id: Option<uuid::Uuid>,
    pub received_at: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
    pub qty: Quantity,
    pub cost: &'a CostInfo,
}

/// Inventory ledger repository.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets or creates the item for a name/unit pair in the branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn ensure_item(
        &self,
        scope: &BranchScope,
        key: &ItemKey,
    ) -> Result<StockItem, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let model = Self::ensure_item_in(stx.transaction(), scope, key).await?;
        stx.commit().await.map_err(db_err)?;
        StockItem::from_model(&model)
    }

    /// Gets an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is not in the caller's branch.
    pub async fn get_item(
        &self,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<StockItem, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let model = Self::get_item_in(stx.transaction(), scope, item_id).await?;
        stx.commit().await.map_err(db_err)?;
        StockItem::from_model(&model)
    }

    /// Finds an item by name and unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_item_by_key(
        &self,
        scope: &BranchScope,
        key: &ItemKey,
    ) -> Result<Option<StockItem>, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let model = Self::find_item_in(stx.transaction(), scope, key).await?;
        stx.commit().await.map_err(db_err)?;
        model.as_ref().map(StockItem::from_model).transpose()
    }

    /// Lists an item's lots in creation order, depleted ones included.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is not in the caller's branch.
    pub async fn list_lots(
        &self,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<Vec<LotSnapshot>, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        Self::get_item_in(txn, scope, item_id).await?;
        let lots = Self::lots_in(txn, scope, item_id).await?;
        stx.commit().await.map_err(db_err)?;
        Ok(lots)
    }

    /// Lists the movements written for a source document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_movements(
        &self,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<Vec<Movement>, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let movements = Self::movements_for_source_in(stx.transaction(), scope, source).await?;
        stx.commit().await.map_err(db_err)?;
        Ok(movements)
    }

    /// Recomputes an item's on-hand from its lots.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item is not in the caller's branch.
    pub async fn recompute_projection(
        &self,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<ProjectionDelta, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        Self::lock_item_in(txn, scope, item_id).await?;
        let delta = Self::recompute_projection_in(txn, scope, item_id).await?;
        stx.commit().await.map_err(db_err)?;
        Ok(delta)
    }

    /// Audits cached on-hand values and lot conservation for the branch, or
    /// for one item.
    ///
    /// Mismatches never fail the call. With `fix`, stale cached values are
    /// overwritten with the recomputed truth; lot rows are never touched.
    /// Every run records an audit event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `item_id` is not in the caller's branch.
    pub async fn audit_on_hand(
        &self,
        scope: &BranchScope,
        item_id: Option<ItemId>,
        fix: bool,
    ) -> Result<AuditReport, StockError> {
        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();

        let mut query = Self::item_query(scope).order_by_asc(inventory_items::Column::Id);
        if let Some(item_id) = item_id {
            query = query.filter(inventory_items::Column::Id.eq(item_id.into_inner()));
        }
        if fix {
            query = query.lock_exclusive();
        }
        let items = query.all(txn).await.map_err(db_err)?;
        if let Some(item_id) = item_id {
            if items.is_empty() {
                return Err(StockError::not_found("item", item_id));
            }
        }

        let mut report = AuditReport::default();
        for item in &items {
            let item_id = ItemId::from(item.id);
            let lots = Self::lots_in(txn, scope, item_id).await?;
            let movements = Self::movements_for_item_in(txn, scope, item_id).await?;

            let mut by_lot: HashMap<LotId, Vec<(MovementType, Quantity)>> = HashMap::new();
            for m in &movements {
                by_lot
                    .entry(m.lot_id)
                    .or_default()
                    .push((m.movement_type, m.qty));
            }

            let mut item_audit: ItemAudit = Projection::audit_item(
                item_id,
                quantity(&item.on_hand)?,
                lots.iter().map(|lot| lot.remaining_qty),
            );
            if !item_audit.matches {
                warn!(
                    item_id = %item_id,
                    cached = %item_audit.cached,
                    truth = %item_audit.truth,
                    "On-hand projection mismatch"
                );
                if fix {
                    Self::write_on_hand_in(txn, item_id, item_audit.truth).await?;
                    item_audit.fixed = true;
                    info!(item_id = %item_id, on_hand = %item_audit.truth, "On-hand projection repaired");
                }
            }
            report.items.push(item_audit);

            for lot in &lots {
                let lot_audit: LotAudit = Projection::audit_lot(
                    lot,
                    by_lot.get(&lot.id).into_iter().flatten().copied(),
                );
                if !lot_audit.matches || lot_audit.invalid {
                    warn!(
                        lot_id = %lot.id,
                        expected = %lot_audit.expected_remaining,
                        actual = %lot_audit.actual_remaining,
                        invalid = lot_audit.invalid,
                        "Lot conservation mismatch"
                    );
                }
                report.lots.push(lot_audit);
            }
        }

        Self::record_audit_event_in(txn, scope, item_id, &report, fix).await?;
        stx.commit().await.map_err(db_err)?;

        info!(
            branch_id = %scope.branch_id(),
            items = report.items.len(),
            item_mismatches = report.item_mismatches().count(),
            lot_mismatches = report.lot_mismatches().count(),
            fix,
            "Inventory audit completed"
        );
        Ok(report)
    }

    // ========== In-transaction helpers ==========

    /// Get-or-create without aborting the surrounding transaction on a race.
    pub(crate) async fn ensure_item_in<C>(
        conn: &C,
        scope: &BranchScope,
        key: &ItemKey,
    ) -> Result<inventory_items::Model, StockError>
    where
        C: ConnectionTrait,
    {
        let at = now();
        let row = inventory_items::ActiveModel {
            id: Set(ItemId::new().into_inner()),
            company_id: Set(scope.company_id().into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            name: Set(key.name.clone()),
            unit: Set(key.unit.clone()),
            on_hand: Set(Quantity::zero().to_string()),
            created_at: Set(at),
            updated_at: Set(at),
        };
        let inserted = inventory_items::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    inventory_items::Column::CompanyId,
                    inventory_items::Column::BranchId,
                    inventory_items::Column::Name,
                    inventory_items::Column::Unit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        if inserted > 0 {
            debug!(item = %key, "Inventory item created");
        }

        Self::find_item_in(conn, scope, key)
            .await?
            .ok_or_else(|| StockError::Internal(format!("item {key} vanished after upsert")))
    }

    async fn get_item_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<inventory_items::Model, StockError>
    where
        C: ConnectionTrait,
    {
        Self::item_query(scope)
            .filter(inventory_items::Column::Id.eq(item_id.into_inner()))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("item", item_id))
    }

    pub(crate) async fn find_item_in<C>(
        conn: &C,
        scope: &BranchScope,
        key: &ItemKey,
    ) -> Result<Option<inventory_items::Model>, StockError>
    where
        C: ConnectionTrait,
    {
        Self::item_query(scope)
            .filter(inventory_items::Column::Name.eq(key.name.as_str()))
            .filter(inventory_items::Column::Unit.eq(key.unit.as_str()))
            .one(conn)
            .await
            .map_err(db_err)
    }

    /// Locks an item row. Callers lock items in ascending ID order.
    pub(crate) async fn lock_item_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<inventory_items::Model, StockError>
    where
        C: ConnectionTrait,
    {
        let model = Self::item_query(scope)
            .filter(inventory_items::Column::Id.eq(item_id.into_inner()))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("item", item_id))?;
        debug!(item_id = %item_id, "Item locked");
        Ok(model)
    }

    /// Locks every lot of the item that still has stock, in `lot_seq` order.
    pub(crate) async fn lock_candidate_lots_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<Vec<LotSnapshot>, StockError>
    where
        C: ConnectionTrait,
    {
        let models = Self::lot_query(scope, item_id)
            .filter(inventory_lots::Column::Depleted.eq(false))
            .order_by_asc(inventory_lots::Column::LotSeq)
            .lock_exclusive()
            .all(conn)
            .await
            .map_err(db_err)?;
        debug!(item_id = %item_id, lots = models.len(), "Candidate lots locked");
        models.iter().map(lot_snapshot).collect()
    }

    /// Finds a lot in the caller's branch, for classifying a bad preferred lot.
    pub(crate) async fn find_lot_in<C>(
        conn: &C,
        scope: &BranchScope,
        lot_id: LotId,
    ) -> Result<Option<LotSnapshot>, StockError>
    where
        C: ConnectionTrait,
    {
        inventory_lots::Entity::find_by_id(lot_id.into_inner())
            .filter(inventory_lots::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(inventory_lots::Column::BranchId.eq(scope.branch_id().into_inner()))
            .one(conn)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(lot_snapshot)
            .transpose()
    }

    /// All lots of an item in creation order.
    pub(crate) async fn lots_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<Vec<LotSnapshot>, StockError>
    where
        C: ConnectionTrait,
    {
        Self::lot_query(scope, item_id)
            .order_by_asc(inventory_lots::Column::LotSeq)
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(lot_snapshot)
            .collect()
    }

    /// Lots opened by a source document.
    pub(crate) async fn lots_for_source_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<Vec<LotSnapshot>, StockError>
    where
        C: ConnectionTrait,
    {
        inventory_lots::Entity::find()
            .filter(inventory_lots::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(inventory_lots::Column::BranchId.eq(scope.branch_id().into_inner()))
            .filter(inventory_lots::Column::SourceType.eq(SourceKind::from(source.source_type)))
            .filter(inventory_lots::Column::SourceId.eq(source.source_id))
            .order_by_asc(inventory_lots::Column::CreatedAt)
            .order_by_asc(inventory_lots::Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(lot_snapshot)
            .collect()
    }

    /// Unit cost and currency of the item's most recent lot.
    pub(crate) async fn latest_cost_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<Option<(UnitCost, String)>, StockError>
    where
        C: ConnectionTrait,
    {
        let latest = Self::lot_query(scope, item_id)
            .order_by_desc(inventory_lots::Column::LotSeq)
            .one(conn)
            .await
            .map_err(db_err)?;
        latest
            .map(|lot| Ok((unit_cost(&lot.unit_cost)?, lot.currency)))
            .transpose()
    }

    /// Opens a lot with `received_qty = remaining_qty = qty`.
    ///
    /// The item must already be locked; `lot_seq` is taken from its lots.
    pub(crate) async fn insert_lot_in<C>(
        conn: &C,
        scope: &BranchScope,
        lot: NewLot<'_>,
    ) -> Result<LotSnapshot, StockError>
    where
        C: ConnectionTrait,
    {
        let last_seq = Self::lot_query(scope, lot.item_id)
            .order_by_desc(inventory_lots::Column::LotSeq)
            .one(conn)
            .await
            .map_err(db_err)?
            .map_or(0, |last| last.lot_seq);

        let at = now();
        let qty = lot.qty.to_string();
        let model = inventory_lots::ActiveModel {
            id: Set(LotId::new().into_inner()),
            company_id: Set(scope.company_id().into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            item_id: Set(lot.item_id.into_inner()),
            lot_seq: Set(last_seq + 1),
            source_type: Set(lot.source.source_type.into()),
            source_id: Set(lot.source.source_id),
            source_line_id: Set(lot.source_line_id),
            received_at: Set(lot.received_at.into()),
            expiry_date: Set(lot.expiry_date),
            received_qty: Set(qty.clone()),
            remaining_qty: Set(qty),
            unit_cost: Set(lot.cost.unit_cost.to_string()),
            currency: Set(lot.cost.currency.clone()),
            depleted: Set(!lot.qty.is_positive()),
            created_at: Set(at),
            updated_at: Set(at),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        lot_snapshot(&model)
    }

    /// Writes a lot's new remaining quantity.
    pub(crate) async fn write_remaining_in<C>(
        conn: &C,
        lot_id: LotId,
        remaining: Quantity,
    ) -> Result<(), StockError>
    where
        C: ConnectionTrait,
    {
        if remaining.is_negative() {
            return Err(StockError::Internal(format!(
                "lot {lot_id} would go negative ({remaining})"
            )));
        }
        inventory_lots::Entity::update_many()
            .col_expr(
                inventory_lots::Column::RemainingQty,
                Expr::value(remaining.to_string()),
            )
            .col_expr(inventory_lots::Column::Depleted, Expr::value(remaining.is_zero()))
            .col_expr(inventory_lots::Column::UpdatedAt, Expr::value(now()))
            .filter(inventory_lots::Column::Id.eq(lot_id.into_inner()))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Appends a movement row. `qty` is signed by the movement type.
    pub(crate) async fn insert_movement_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
        lot: (ItemId, LotId, UnitCost),
        movement_type: MovementType,
        qty: Quantity,
    ) -> Result<Movement, StockError>
    where
        C: ConnectionTrait,
    {
        let (item_id, lot_id, cost) = lot;
        let model = inventory_movements::ActiveModel {
            id: Set(MovementId::new().into_inner()),
            company_id: Set(scope.company_id().into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            item_id: Set(item_id.into_inner()),
            lot_id: Set(lot_id.into_inner()),
            movement_type: Set(movement_type.into()),
            qty: Set(movement_type.signed(qty).to_string()),
            unit_cost: Set(cost.to_string()),
            source_type: Set(source.source_type.into()),
            source_id: Set(source.source_id),
            actor_id: Set(scope.actor_id().into_inner()),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        movement(&model)
    }

    /// Movements written for a source document, in write order.
    pub(crate) async fn movements_for_source_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<Vec<Movement>, StockError>
    where
        C: ConnectionTrait,
    {
        Self::movement_query(scope)
            .filter(
                inventory_movements::Column::SourceType.eq(SourceKind::from(source.source_type)),
            )
            .filter(inventory_movements::Column::SourceId.eq(source.source_id))
            .order_by_asc(inventory_movements::Column::CreatedAt)
            .order_by_asc(inventory_movements::Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(movement)
            .collect()
    }

    async fn movements_for_item_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<Vec<Movement>, StockError>
    where
        C: ConnectionTrait,
    {
        Self::movement_query(scope)
            .filter(inventory_movements::Column::ItemId.eq(item_id.into_inner()))
            .order_by_asc(inventory_movements::Column::CreatedAt)
            .order_by_asc(inventory_movements::Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(movement)
            .collect()
    }

    /// Overwrites `on_hand` with `Σ lot.remaining_qty`.
    ///
    /// The only sanctioned write to `on_hand`. Must run after every lot
    /// mutation for the item, in the same transaction.
    pub(crate) async fn recompute_projection_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<ProjectionDelta, StockError>
    where
        C: ConnectionTrait,
    {
        let item = Self::item_query(scope)
            .filter(inventory_items::Column::Id.eq(item_id.into_inner()))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("item", item_id))?;
        let before = quantity(&item.on_hand)?;

        let lots = Self::lots_in(conn, scope, item_id).await?;
        let after = Projection::on_hand(lots.iter().map(|lot| lot.remaining_qty));
        Self::write_on_hand_in(conn, item_id, after).await?;

        debug!(item_id = %item_id, before = %before, after = %after, "Projection recomputed");
        Ok(ProjectionDelta {
            item_id,
            before,
            after,
        })
    }

    async fn write_on_hand_in<C>(
        conn: &C,
        item_id: ItemId,
        on_hand: Quantity,
    ) -> Result<(), StockError>
    where
        C: ConnectionTrait,
    {
        inventory_items::Entity::update_many()
            .col_expr(inventory_items::Column::OnHand, Expr::value(on_hand.to_string()))
            .col_expr(inventory_items::Column::UpdatedAt, Expr::value(now()))
            .filter(inventory_items::Column::Id.eq(item_id.into_inner()))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn record_audit_event_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: Option<ItemId>,
        report: &AuditReport,
        fix: bool,
    ) -> Result<(), StockError>
    where
        C: ConnectionTrait,
    {
        let items: Vec<_> = report.item_mismatches().collect();
        let lots: Vec<_> = report.lot_mismatches().collect();
        let count = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);

        inventory_audit_events::ActiveModel {
            id: Set(AuditEventId::new().into_inner()),
            company_id: Set(scope.company_id().into_inner()),
            branch_id: Set(scope.branch_id().into_inner()),
            actor_id: Set(scope.actor_id().into_inner()),
            item_id: Set(item_id.map(ItemId::into_inner)),
            items_checked: Set(count(report.items.len())),
            item_mismatches: Set(count(items.len())),
            lot_mismatches: Set(count(lots.len())),
            fix_applied: Set(items.iter().any(|item| item.fixed)),
            detail: Set(json!({
                "fix_requested": fix,
                "items": items,
                "lots": lots,
            })),
            created_at: Set(now()),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    fn item_query(scope: &BranchScope) -> sea_orm::Select<inventory_items::Entity> {
        inventory_items::Entity::find()
            .filter(inventory_items::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(inventory_items::Column::BranchId.eq(scope.branch_id().into_inner()))
    }

    fn lot_query(scope: &BranchScope, item_id: ItemId) -> sea_orm::Select<inventory_lots::Entity> {
        inventory_lots::Entity::find()
            .filter(inventory_lots::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(inventory_lots::Column::BranchId.eq(scope.branch_id().into_inner()))
            .filter(inventory_lots::Column::ItemId.eq(item_id.into_inner()))
    }

    fn movement_query(scope: &BranchScope) -> sea_orm::Select<inventory_movements::Entity> {
        inventory_movements::Entity::find()
            .filter(inventory_movements::Column::CompanyId.eq(scope.company_id().into_inner()))
            .filter(inventory_movements::Column::BranchId.eq(scope.branch_id().into_inner()))
    }
}
