//! Posting repository: the direction router.
//!
//! Every posting runs in one scoped transaction:
//!
//! 1. lock the stock document and decide whether to run or replay
//! 2. get-or-create items in key order, then lock them in ID order
//! 3. open lots (in) or lock candidate lots and run FIFO (out)
//! 4. write movements and recompute each touched item's on-hand once
//! 5. resolve `POSTED` or `DISCREPANCY`, derive the journal, commit
//!
//! Any error before the commit rolls everything back, including items
//! created in step 2.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use larder_core::StockError;
use larder_core::posting::{
    AdjustmentInput, AdjustmentLine, AdjustmentPosting, ConsumedLot, ConsumptionInput,
    ConsumptionLine, ConsumptionPosting, CostInfo, DEFAULT_CURRENCY, DocumentStatus,
    DocumentWorkflow, LineValidator, PostedDocument, PostingGate, PostingRequest,
    ProjectionDelta, ReceiptInput, ReceiptLine, ReceiptPosting, SourceRef,
};
use larder_core::stock::{
    Direction, FifoAllocator, ItemKey, LotSelection, LotSnapshot, Movement, MovementType,
    OrderingPolicy,
};
use larder_shared::types::{BranchScope, DocumentId, ItemId, JournalId, Quantity, UnitCost};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, info};

use super::convert::db_err;
use super::document::DocumentRepository;
use super::inventory::{InventoryRepository, NewLot};
use super::journal::JournalRepository;
use crate::entities::stock_documents;
use crate::rls::ScopedTransaction;

/// One outbound line after item resolution.
struct Demand {
    item_id: ItemId,
    qty: Quantity,
    selection: LotSelection,
}

/// Posting repository.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a goods receipt: one new lot and one `RECEIPT` movement per line.
    ///
    /// A receipt already posted is replayed: the stored lots, movements and
    /// journal are returned with `replayed = true` and nothing is written.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a receipt without lines, `InvalidQuantity` for
    ///   non-positive ones
    /// - `DirectionMismatch` if the source is not a goods receipt
    /// - `InvalidState` unless the document is `SUBMITTED` (or terminal)
    /// - `MissingAccount` if the journal cannot be resolved
    pub async fn post_receipt(
        &self,
        scope: &BranchScope,
        input: ReceiptInput,
    ) -> Result<ReceiptPosting, StockError> {
        LineValidator::receipt(&input.lines)?;
        expect_movement(&input.source, Direction::In, MovementType::Receipt)?;
        let source = input.source;

        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        let (document, gate) = Self::open_in(txn, scope, &source).await?;

        if gate == PostingGate::Replay {
            let lots = InventoryRepository::lots_for_source_in(txn, scope, &source)
                .await?
                .into_iter()
                .map(as_received)
                .collect();
            let movements =
                InventoryRepository::movements_for_source_in(txn, scope, &source).await?;
            let header = Self::replay_header_in(txn, scope, &source, &document).await?;
            stx.commit().await.map_err(db_err)?;
            return Ok(ReceiptPosting {
                document: header,
                lots,
                movements,
                projections: DocumentRepository::stored_projections(&document)?,
            });
        }

        let items = Self::lock_items_in(txn, scope, input.lines.iter().map(|line| &line.item))
            .await?;

        let mut lots = Vec::with_capacity(input.lines.len());
        let mut movements = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item_id = item_for(&items, &line.item)?;
            let lot = InventoryRepository::insert_lot_in(
                txn,
                scope,
                NewLot {
                    item_id,
                    source: &source,
                    source_line_id: line.line_ref,
                    received_at: input.received_at,
                    expiry_date: line.expiry_date,
                    qty: line.qty,
                    cost: &line.cost,
                },
            )
            .await?;
            let movement = InventoryRepository::insert_movement_in(
                txn,
                scope,
                &source,
                (item_id, lot.id, lot.unit_cost),
                MovementType::Receipt,
                line.qty,
            )
            .await?;
            lots.push(lot);
            movements.push(movement);
        }

        let projections = Self::recompute_in(txn, scope, &items).await?;
        let status = DocumentWorkflow::resolve_terminal(
            input.lines.iter().map(|line| (line.expected_qty, line.qty)),
        );
        let header =
            Self::finish_in(txn, scope, &source, document, status, &movements, &projections)
                .await?;
        stx.commit().await.map_err(db_err)?;

        info!(
            source = %source,
            status = %header.status,
            lots = lots.len(),
            journal_id = ?header.journal_id.map(JournalId::into_inner),
            "Goods receipt posted"
        );
        Ok(ReceiptPosting {
            document: header,
            lots,
            movements,
            projections,
        })
    }

    /// Posts a kitchen consumption batch, depleting lots in FIFO order.
    ///
    /// Lines are allocated in input order against the same locked lots, so
    /// two lines for one item see each other's depletion.
    ///
    /// # Errors
    ///
    /// - `InsufficientStock` if any line cannot be fully covered
    /// - `PreferredLotInvalid` if a pinned lot cannot be used
    /// - `InvalidState` unless the document is `SUBMITTED` (or terminal)
    /// - `DirectionMismatch` if the source is not a kitchen consumption
    pub async fn post_consumption(
        &self,
        scope: &BranchScope,
        input: ConsumptionInput,
    ) -> Result<ConsumptionPosting, StockError> {
        LineValidator::consumption(&input.lines)?;
        expect_movement(&input.source, Direction::Out, MovementType::Consumption)?;
        let source = input.source;

        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        let (document, gate) = Self::open_in(txn, scope, &source).await?;

        if gate == PostingGate::Replay {
            let movements =
                InventoryRepository::movements_for_source_in(txn, scope, &source).await?;
            let header = Self::replay_header_in(txn, scope, &source, &document).await?;
            stx.commit().await.map_err(db_err)?;
            return Ok(ConsumptionPosting {
                document: header,
                allocations: movements.iter().map(ConsumedLot::from_movement).collect(),
                movements,
                projections: DocumentRepository::stored_projections(&document)?,
            });
        }

        let items = Self::lock_items_in(txn, scope, input.lines.iter().map(|line| &line.item))
            .await?;
        let demands = input
            .lines
            .iter()
            .map(|line| {
                Ok(Demand {
                    item_id: item_for(&items, &line.item)?,
                    qty: line.qty,
                    selection: line.selection(input.policy),
                })
            })
            .collect::<Result<Vec<_>, StockError>>()?;

        let (allocations, movements) =
            Self::deplete_in(txn, scope, &source, MovementType::Consumption, &items, &demands)
                .await?;

        let projections = Self::recompute_in(txn, scope, &items).await?;
        let status = DocumentWorkflow::resolve_terminal(
            input.lines.iter().map(|line| (line.expected_qty, line.qty)),
        );
        let header =
            Self::finish_in(txn, scope, &source, document, status, &movements, &projections)
                .await?;
        stx.commit().await.map_err(db_err)?;

        info!(
            source = %source,
            status = %header.status,
            lots_touched = allocations.len(),
            journal_id = ?header.journal_id.map(JournalId::into_inner),
            "Kitchen consumption posted"
        );
        Ok(ConsumptionPosting {
            document: header,
            allocations,
            movements,
            projections,
        })
    }

    /// Posts a stock adjustment in either direction.
    ///
    /// In opens a lot. Without an explicit cost it takes the unit cost and
    /// currency of the item's most recent lot, or zero when there is none.
    /// Out depletes lots in FIFO order like a consumption.
    ///
    /// # Errors
    ///
    /// - `InsufficientStock` / `PreferredLotInvalid` for outbound adjustments
    /// - `InvalidState` unless the document is `DRAFT` or `SUBMITTED` (or terminal)
    /// - `DirectionMismatch` if the source is not a stock adjustment
    pub async fn post_adjustment(
        &self,
        scope: &BranchScope,
        input: AdjustmentInput,
    ) -> Result<AdjustmentPosting, StockError> {
        LineValidator::adjustment(&input.line)?;
        let kind = match input.direction {
            Direction::In => MovementType::AdjustmentIn,
            Direction::Out => MovementType::AdjustmentOut,
        };
        expect_movement(&input.source, input.direction, kind)?;
        let source = input.source;
        let line = &input.line;

        let stx = ScopedTransaction::begin(&self.db, *scope)
            .await
            .map_err(db_err)?;
        let txn = stx.transaction();
        let (document, gate) = Self::open_in(txn, scope, &source).await?;

        if gate == PostingGate::Replay {
            let lot = InventoryRepository::lots_for_source_in(txn, scope, &source)
                .await?
                .into_iter()
                .next()
                .map(as_received);
            let movements =
                InventoryRepository::movements_for_source_in(txn, scope, &source).await?;
            let header = Self::replay_header_in(txn, scope, &source, &document).await?;
            stx.commit().await.map_err(db_err)?;
            return Ok(AdjustmentPosting {
                document: header,
                direction: input.direction,
                lot,
                movements,
                projections: DocumentRepository::stored_projections(&document)?,
            });
        }

        let items = Self::lock_items_in(txn, scope, std::iter::once(&line.item)).await?;
        let item_id = item_for(&items, &line.item)?;

        let (lot, movements) = match input.direction {
            Direction::In => {
                let cost = match &line.cost {
                    Some(cost) => cost.clone(),
                    None => Self::fallback_cost_in(txn, scope, item_id).await?,
                };
                let lot = InventoryRepository::insert_lot_in(
                    txn,
                    scope,
                    NewLot {
                        item_id,
                        source: &source,
                        source_line_id: None,
                        received_at: Utc::now(),
                        expiry_date: line.expiry_date,
                        qty: line.qty,
                        cost: &cost,
                    },
                )
                .await?;
                let movement = InventoryRepository::insert_movement_in(
                    txn,
                    scope,
                    &source,
                    (item_id, lot.id, lot.unit_cost),
                    kind,
                    line.qty,
                )
                .await?;
                (Some(lot), vec![movement])
            }
            Direction::Out => {
                let demand = Demand {
                    item_id,
                    qty: line.qty,
                    selection: line
                        .preferred_lot
                        .map_or(LotSelection::Ordered(input.policy), LotSelection::Preferred),
                };
                let (_, movements) =
                    Self::deplete_in(txn, scope, &source, kind, &items, &[demand]).await?;
                (None, movements)
            }
        };

        let projections = Self::recompute_in(txn, scope, &items).await?;
        let status = DocumentWorkflow::resolve_terminal([(None, line.qty)]);
        let header =
            Self::finish_in(txn, scope, &source, document, status, &movements, &projections)
                .await?;
        stx.commit().await.map_err(db_err)?;

        info!(
            source = %source,
            direction = %input.direction,
            qty = %line.qty,
            journal_id = ?header.journal_id.map(JournalId::into_inner),
            "Stock adjustment posted"
        );
        Ok(AdjustmentPosting {
            document: header,
            direction: input.direction,
            lot,
            movements,
            projections,
        })
    }

    /// Single-line entry point that routes by direction and document type.
    ///
    /// Goods receipts must carry a cost; consumptions ignore it.
    ///
    /// # Errors
    ///
    /// `DirectionMismatch` when the direction does not fit the document
    /// type, plus every error of the typed posting it routes to.
    pub async fn post(
        &self,
        scope: &BranchScope,
        request: PostingRequest,
    ) -> Result<PostedDocument, StockError> {
        let PostingRequest {
            direction,
            source,
            item,
            qty,
            cost,
        } = request;

        match source.source_type.movement_type(direction)? {
            MovementType::Receipt => {
                let cost = cost.ok_or_else(|| {
                    StockError::InvalidInput(format!("receipt of {item} requires a unit cost"))
                })?;
                let input = ReceiptInput {
                    source,
                    received_at: Utc::now(),
                    lines: vec![ReceiptLine {
                        item,
                        qty,
                        cost,
                        expiry_date: None,
                        expected_qty: None,
                        line_ref: None,
                    }],
                };
                Ok(self.post_receipt(scope, input).await?.document)
            }
            MovementType::Consumption => {
                let input = ConsumptionInput {
                    source,
                    policy: OrderingPolicy::default(),
                    lines: vec![ConsumptionLine {
                        item,
                        qty,
                        expected_qty: None,
                        preferred_lot: None,
                    }],
                };
                Ok(self.post_consumption(scope, input).await?.document)
            }
            MovementType::AdjustmentIn | MovementType::AdjustmentOut => {
                let input = AdjustmentInput {
                    source,
                    direction,
                    policy: OrderingPolicy::default(),
                    line: AdjustmentLine {
                        item,
                        qty,
                        cost,
                        expiry_date: None,
                        preferred_lot: None,
                    },
                };
                Ok(self.post_adjustment(scope, input).await?.document)
            }
        }
    }

    // ========== Steps ==========

    /// Locks the document and decides between running and replaying.
    async fn open_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
    ) -> Result<(stock_documents::Model, PostingGate), StockError>
    where
        C: ConnectionTrait,
    {
        let document = DocumentRepository::lock_in(conn, scope, source).await?;
        let gate = DocumentWorkflow::gate(source, document.status.into())?;
        if gate == PostingGate::Replay {
            debug!(source = %source, status = ?document.status, "Document already posted, replaying");
        }
        Ok((document, gate))
    }

    /// Gets or creates every item in key order, then locks them in ID order.
    async fn lock_items_in<'a, C, I>(
        conn: &C,
        scope: &BranchScope,
        keys: I,
    ) -> Result<BTreeMap<ItemKey, ItemId>, StockError>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = &'a ItemKey>,
    {
        let mut items: BTreeMap<ItemKey, ItemId> =
            keys.into_iter().map(|key| (key.clone(), ItemId::new())).collect();
        for (key, id) in &mut items {
            *id = InventoryRepository::ensure_item_in(conn, scope, key)
                .await?
                .id
                .into();
        }

        let mut ids: Vec<ItemId> = items.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        for item_id in ids {
            InventoryRepository::lock_item_in(conn, scope, item_id).await?;
        }
        Ok(items)
    }

    /// Runs FIFO for every demand and writes the resulting lots and movements.
    ///
    /// All allocation happens on locked in-memory snapshots first; nothing is
    /// written unless every demand is covered.
    async fn deplete_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
        kind: MovementType,
        items: &BTreeMap<ItemKey, ItemId>,
        demands: &[Demand],
    ) -> Result<(Vec<ConsumedLot>, Vec<Movement>), StockError>
    where
        C: ConnectionTrait,
    {
        let mut ids: Vec<ItemId> = items.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        let mut candidates: HashMap<ItemId, Vec<LotSnapshot>> = HashMap::new();
        for item_id in ids {
            let lots = InventoryRepository::lock_candidate_lots_in(conn, scope, item_id).await?;
            candidates.insert(item_id, lots);
        }

        let mut planned = Vec::new();
        for demand in demands {
            let lots = candidates
                .get_mut(&demand.item_id)
                .ok_or_else(|| StockError::not_found("item", demand.item_id))?;

            let preferred = match demand.selection {
                LotSelection::Preferred(lot_id) => {
                    match lots.iter().find(|lot| lot.id == lot_id) {
                        Some(lot) => Some(lot.clone()),
                        None => InventoryRepository::find_lot_in(conn, scope, lot_id).await?,
                    }
                }
                LotSelection::Ordered(_) => None,
            };

            let allocations = FifoAllocator::allocate(
                demand.item_id,
                scope.branch_id(),
                lots,
                demand.selection,
                preferred.as_ref(),
                demand.qty,
            )?;
            FifoAllocator::apply(lots, &allocations)?;
            planned.extend(allocations.into_iter().map(|a| (demand.item_id, a)));
        }

        let mut consumed = Vec::with_capacity(planned.len());
        let mut movements = Vec::with_capacity(planned.len());
        for (item_id, allocation) in planned {
            InventoryRepository::write_remaining_in(
                conn,
                allocation.lot_id,
                allocation.remaining_after,
            )
            .await?;
            let movement = InventoryRepository::insert_movement_in(
                conn,
                scope,
                source,
                (item_id, allocation.lot_id, allocation.unit_cost),
                kind,
                allocation.qty_taken,
            )
            .await?;
            debug!(
                lot_id = %allocation.lot_id,
                taken = %allocation.qty_taken,
                remaining = %allocation.remaining_after,
                "Lot depleted"
            );
            consumed.push(ConsumedLot::from_movement(&movement));
            movements.push(movement);
        }
        Ok((consumed, movements))
    }

    /// Recomputes on-hand once per touched item, in ID order.
    async fn recompute_in<C>(
        conn: &C,
        scope: &BranchScope,
        items: &BTreeMap<ItemKey, ItemId>,
    ) -> Result<Vec<ProjectionDelta>, StockError>
    where
        C: ConnectionTrait,
    {
        let mut ids: Vec<ItemId> = items.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        let mut deltas = Vec::with_capacity(ids.len());
        for item_id in ids {
            deltas.push(InventoryRepository::recompute_projection_in(conn, scope, item_id).await?);
        }
        Ok(deltas)
    }

    /// Cost for an inbound adjustment that named none.
    async fn fallback_cost_in<C>(
        conn: &C,
        scope: &BranchScope,
        item_id: ItemId,
    ) -> Result<CostInfo, StockError>
    where
        C: ConnectionTrait,
    {
        let cost = match InventoryRepository::latest_cost_in(conn, scope, item_id).await? {
            Some((unit_cost, currency)) => CostInfo {
                unit_cost,
                currency,
            },
            None => CostInfo {
                unit_cost: UnitCost::zero(),
                currency: DEFAULT_CURRENCY.to_string(),
            },
        };
        debug!(item_id = %item_id, unit_cost = %cost.unit_cost, "Adjustment cost taken from latest lot");
        Ok(cost)
    }

    /// Derives the journal and moves the document to its terminal status.
    async fn finish_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
        document: stock_documents::Model,
        status: DocumentStatus,
        movements: &[Movement],
        projections: &[ProjectionDelta],
    ) -> Result<PostedDocument, StockError>
    where
        C: ConnectionTrait,
    {
        let journal =
            JournalRepository::derive_and_persist_in(conn, scope, source, movements).await?;
        let transition = DocumentWorkflow::post(status, scope.actor_id());
        let document = DocumentRepository::apply_in(conn, document, &transition, projections).await?;

        Ok(PostedDocument {
            document_id: DocumentId::from(document.id),
            source: *source,
            status: document.status.into(),
            journal_id: journal.map(|journal| journal.id()),
            replayed: false,
        })
    }

    /// Header for a document that was already posted.
    async fn replay_header_in<C>(
        conn: &C,
        scope: &BranchScope,
        source: &SourceRef,
        document: &stock_documents::Model,
    ) -> Result<PostedDocument, StockError>
    where
        C: ConnectionTrait,
    {
        let journal = JournalRepository::find_in(conn, scope, source).await?;
        Ok(PostedDocument {
            document_id: DocumentId::from(document.id),
            source: *source,
            status: document.status.into(),
            journal_id: journal.map(|journal| journal.id()),
            replayed: true,
        })
    }
}

/// Checks that a typed posting call matches the document type.
fn expect_movement(
    source: &SourceRef,
    direction: Direction,
    expected: MovementType,
) -> Result<(), StockError> {
    let mismatch = || StockError::DirectionMismatch {
        source_type: source.source_type.to_string(),
        direction: direction.to_string(),
    };
    match source.source_type.movement_type(direction) {
        Ok(kind) if kind == expected => Ok(()),
        _ => Err(mismatch()),
    }
}

/// A lot as it stood when its document was posted.
fn as_received(mut lot: LotSnapshot) -> LotSnapshot {
    lot.remaining_qty = lot.received_qty;
    lot
}

fn item_for(items: &BTreeMap<ItemKey, ItemId>, key: &ItemKey) -> Result<ItemId, StockError> {
    items
        .get(key)
        .copied()
        .ok_or_else(|| StockError::Internal(format!("item {key} was not resolved")))
}
