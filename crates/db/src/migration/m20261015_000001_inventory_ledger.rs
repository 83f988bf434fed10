//! Inventory ledger schema.
//!
//! Written with the schema builder so the same migration runs on
//! PostgreSQL and SQLite. Row-level security is PostgreSQL only and is
//! applied as raw SQL after the tables exist.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_inventory_items(manager).await?;
        create_inventory_lots(manager).await?;
        create_inventory_movements(manager).await?;
        create_stock_documents(manager).await?;
        create_chart_of_accounts(manager).await?;
        create_accounting_journals(manager).await?;
        create_accounting_journal_lines(manager).await?;
        create_idempotency_records(manager).await?;
        create_inventory_audit_events(manager).await?;

        if manager.get_database_backend() == DbBackend::Postgres {
            manager.get_connection().execute_unprepared(RLS_SQL).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryAuditEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdempotencyRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingJournalLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingJournals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChartOfAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryLots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        Ok(())
    }
}

async fn create_inventory_items(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(InventoryItems::Table)
                .if_not_exists()
                .col(ColumnDef::new(InventoryItems::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(InventoryItems::CompanyId).uuid().not_null())
                .col(ColumnDef::new(InventoryItems::BranchId).uuid().not_null())
                .col(ColumnDef::new(InventoryItems::Name).string_len(255).not_null())
                .col(ColumnDef::new(InventoryItems::Unit).string_len(32).not_null())
                .col(ColumnDef::new(InventoryItems::OnHand).string_len(48).not_null())
                .col(
                    ColumnDef::new(InventoryItems::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryItems::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_inventory_items_branch_name_unit")
                .table(InventoryItems::Table)
                .col(InventoryItems::CompanyId)
                .col(InventoryItems::BranchId)
                .col(InventoryItems::Name)
                .col(InventoryItems::Unit)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_inventory_lots(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(InventoryLots::Table)
                .if_not_exists()
                .col(ColumnDef::new(InventoryLots::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(InventoryLots::CompanyId).uuid().not_null())
                .col(ColumnDef::new(InventoryLots::BranchId).uuid().not_null())
                .col(ColumnDef::new(InventoryLots::ItemId).uuid().not_null())
                .col(ColumnDef::new(InventoryLots::LotSeq).big_integer().not_null())
                .col(ColumnDef::new(InventoryLots::SourceType).string_len(32).not_null())
                .col(ColumnDef::new(InventoryLots::SourceId).uuid().not_null())
                .col(ColumnDef::new(InventoryLots::SourceLineId).uuid())
                .col(
                    ColumnDef::new(InventoryLots::ReceivedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(ColumnDef::new(InventoryLots::ExpiryDate).date())
                .col(ColumnDef::new(InventoryLots::ReceivedQty).string_len(48).not_null())
                .col(ColumnDef::new(InventoryLots::RemainingQty).string_len(48).not_null())
                .col(ColumnDef::new(InventoryLots::UnitCost).string_len(48).not_null())
                .col(ColumnDef::new(InventoryLots::Currency).string_len(3).not_null())
                .col(
                    ColumnDef::new(InventoryLots::Depleted)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(InventoryLots::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryLots::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_inventory_lots_item")
                        .from(InventoryLots::Table, InventoryLots::ItemId)
                        .to(InventoryItems::Table, InventoryItems::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_inventory_lots_item_seq")
                .table(InventoryLots::Table)
                .col(InventoryLots::ItemId)
                .col(InventoryLots::LotSeq)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_inventory_lots_candidates")
                .table(InventoryLots::Table)
                .col(InventoryLots::CompanyId)
                .col(InventoryLots::BranchId)
                .col(InventoryLots::ItemId)
                .col(InventoryLots::Depleted)
                .to_owned(),
        )
        .await
}

async fn create_inventory_movements(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(InventoryMovements::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(InventoryMovements::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(InventoryMovements::CompanyId).uuid().not_null())
                .col(ColumnDef::new(InventoryMovements::BranchId).uuid().not_null())
                .col(ColumnDef::new(InventoryMovements::ItemId).uuid().not_null())
                .col(ColumnDef::new(InventoryMovements::LotId).uuid().not_null())
                .col(
                    ColumnDef::new(InventoryMovements::MovementType)
                        .string_len(16)
                        .not_null(),
                )
                .col(ColumnDef::new(InventoryMovements::Qty).string_len(48).not_null())
                .col(ColumnDef::new(InventoryMovements::UnitCost).string_len(48).not_null())
                .col(
                    ColumnDef::new(InventoryMovements::SourceType)
                        .string_len(32)
                        .not_null(),
                )
                .col(ColumnDef::new(InventoryMovements::SourceId).uuid().not_null())
                .col(ColumnDef::new(InventoryMovements::ActorId).uuid().not_null())
                .col(
                    ColumnDef::new(InventoryMovements::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_inventory_movements_item")
                        .from(InventoryMovements::Table, InventoryMovements::ItemId)
                        .to(InventoryItems::Table, InventoryItems::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_inventory_movements_lot")
                        .from(InventoryMovements::Table, InventoryMovements::LotId)
                        .to(InventoryLots::Table, InventoryLots::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_inventory_movements_source")
                .table(InventoryMovements::Table)
                .col(InventoryMovements::CompanyId)
                .col(InventoryMovements::SourceType)
                .col(InventoryMovements::SourceId)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_inventory_movements_lot")
                .table(InventoryMovements::Table)
                .col(InventoryMovements::LotId)
                .to_owned(),
        )
        .await
}

async fn create_stock_documents(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(StockDocuments::Table)
                .if_not_exists()
                .col(ColumnDef::new(StockDocuments::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(StockDocuments::CompanyId).uuid().not_null())
                .col(ColumnDef::new(StockDocuments::BranchId).uuid().not_null())
                .col(ColumnDef::new(StockDocuments::SourceType).string_len(32).not_null())
                .col(ColumnDef::new(StockDocuments::SourceId).uuid().not_null())
                .col(ColumnDef::new(StockDocuments::Status).string_len(16).not_null())
                .col(ColumnDef::new(StockDocuments::SubmittedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(StockDocuments::SubmittedBy).uuid())
                .col(ColumnDef::new(StockDocuments::PostedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(StockDocuments::PostedBy).uuid())
                .col(ColumnDef::new(StockDocuments::Projections).json())
                .col(
                    ColumnDef::new(StockDocuments::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(StockDocuments::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_stock_documents_source")
                .table(StockDocuments::Table)
                .col(StockDocuments::CompanyId)
                .col(StockDocuments::SourceType)
                .col(StockDocuments::SourceId)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_chart_of_accounts(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(ChartOfAccounts::Table)
                .if_not_exists()
                .col(ColumnDef::new(ChartOfAccounts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(ChartOfAccounts::CompanyId).uuid().not_null())
                .col(ColumnDef::new(ChartOfAccounts::Code).string_len(16).not_null())
                .col(ColumnDef::new(ChartOfAccounts::Name).string_len(255).not_null())
                .col(
                    ColumnDef::new(ChartOfAccounts::IsActive)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(ChartOfAccounts::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_chart_of_accounts_code")
                .table(ChartOfAccounts::Table)
                .col(ChartOfAccounts::CompanyId)
                .col(ChartOfAccounts::Code)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_accounting_journals(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(AccountingJournals::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AccountingJournals::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(AccountingJournals::CompanyId).uuid().not_null())
                .col(ColumnDef::new(AccountingJournals::BranchId).uuid().not_null())
                .col(
                    ColumnDef::new(AccountingJournals::SourceType)
                        .string_len(32)
                        .not_null(),
                )
                .col(ColumnDef::new(AccountingJournals::SourceId).uuid().not_null())
                .col(ColumnDef::new(AccountingJournals::Status).string_len(16).not_null())
                .col(ColumnDef::new(AccountingJournals::Memo).text().not_null())
                .col(
                    ColumnDef::new(AccountingJournals::TotalDebit)
                        .string_len(48)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(AccountingJournals::TotalCredit)
                        .string_len(48)
                        .not_null(),
                )
                .col(ColumnDef::new(AccountingJournals::ReversalOf).uuid())
                .col(ColumnDef::new(AccountingJournals::VoidReason).text())
                .col(ColumnDef::new(AccountingJournals::VoidedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(AccountingJournals::VoidedBy).uuid())
                .col(ColumnDef::new(AccountingJournals::CreatedBy).uuid().not_null())
                .col(
                    ColumnDef::new(AccountingJournals::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_accounting_journals_reversal_of")
                        .from(AccountingJournals::Table, AccountingJournals::ReversalOf)
                        .to(AccountingJournals::Table, AccountingJournals::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_accounting_journals_source")
                .table(AccountingJournals::Table)
                .col(AccountingJournals::CompanyId)
                .col(AccountingJournals::SourceType)
                .col(AccountingJournals::SourceId)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_accounting_journal_lines(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(AccountingJournalLines::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AccountingJournalLines::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(AccountingJournalLines::JournalId).uuid().not_null())
                .col(ColumnDef::new(AccountingJournalLines::CompanyId).uuid().not_null())
                .col(ColumnDef::new(AccountingJournalLines::LineNo).integer().not_null())
                .col(ColumnDef::new(AccountingJournalLines::AccountId).uuid().not_null())
                .col(
                    ColumnDef::new(AccountingJournalLines::AccountCode)
                        .string_len(16)
                        .not_null(),
                )
                .col(ColumnDef::new(AccountingJournalLines::Side).string_len(8).not_null())
                .col(
                    ColumnDef::new(AccountingJournalLines::Amount)
                        .string_len(48)
                        .not_null(),
                )
                .col(ColumnDef::new(AccountingJournalLines::LotId).uuid())
                .col(ColumnDef::new(AccountingJournalLines::MovementId).uuid())
                .col(ColumnDef::new(AccountingJournalLines::Memo).text().not_null())
                .col(
                    ColumnDef::new(AccountingJournalLines::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_accounting_journal_lines_journal")
                        .from(AccountingJournalLines::Table, AccountingJournalLines::JournalId)
                        .to(AccountingJournals::Table, AccountingJournals::Id),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_accounting_journal_lines_account")
                        .from(AccountingJournalLines::Table, AccountingJournalLines::AccountId)
                        .to(ChartOfAccounts::Table, ChartOfAccounts::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_accounting_journal_lines_no")
                .table(AccountingJournalLines::Table)
                .col(AccountingJournalLines::JournalId)
                .col(AccountingJournalLines::LineNo)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_idempotency_records(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(IdempotencyRecords::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(IdempotencyRecords::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(IdempotencyRecords::CompanyId).uuid().not_null())
                .col(ColumnDef::new(IdempotencyRecords::ActorId).uuid().not_null())
                .col(
                    ColumnDef::new(IdempotencyRecords::IdempotencyKey)
                        .string_len(255)
                        .not_null(),
                )
                .col(ColumnDef::new(IdempotencyRecords::Method).string_len(16).not_null())
                .col(ColumnDef::new(IdempotencyRecords::Path).string_len(512).not_null())
                .col(
                    ColumnDef::new(IdempotencyRecords::RequestHash)
                        .string_len(64)
                        .not_null(),
                )
                .col(ColumnDef::new(IdempotencyRecords::State).string_len(16).not_null())
                .col(ColumnDef::new(IdempotencyRecords::ResponseStatus).integer())
                .col(ColumnDef::new(IdempotencyRecords::ResponseBody).json())
                .col(
                    ColumnDef::new(IdempotencyRecords::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(ColumnDef::new(IdempotencyRecords::CompletedAt).timestamp_with_time_zone())
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_idempotency_records_key")
                .table(IdempotencyRecords::Table)
                .col(IdempotencyRecords::CompanyId)
                .col(IdempotencyRecords::ActorId)
                .col(IdempotencyRecords::IdempotencyKey)
                .col(IdempotencyRecords::Method)
                .col(IdempotencyRecords::Path)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_inventory_audit_events(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(InventoryAuditEvents::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(InventoryAuditEvents::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(InventoryAuditEvents::CompanyId).uuid().not_null())
                .col(ColumnDef::new(InventoryAuditEvents::BranchId).uuid().not_null())
                .col(ColumnDef::new(InventoryAuditEvents::ActorId).uuid().not_null())
                .col(ColumnDef::new(InventoryAuditEvents::ItemId).uuid())
                .col(
                    ColumnDef::new(InventoryAuditEvents::ItemsChecked)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryAuditEvents::ItemMismatches)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryAuditEvents::LotMismatches)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(InventoryAuditEvents::FixApplied)
                        .boolean()
                        .not_null(),
                )
                .col(ColumnDef::new(InventoryAuditEvents::Detail).json().not_null())
                .col(
                    ColumnDef::new(InventoryAuditEvents::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum InventoryItems {
    Table,
    Id,
    CompanyId,
    BranchId,
    Name,
    Unit,
    OnHand,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryLots {
    Table,
    Id,
    CompanyId,
    BranchId,
    ItemId,
    LotSeq,
    SourceType,
    SourceId,
    SourceLineId,
    ReceivedAt,
    ExpiryDate,
    ReceivedQty,
    RemainingQty,
    UnitCost,
    Currency,
    Depleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryMovements {
    Table,
    Id,
    CompanyId,
    BranchId,
    ItemId,
    LotId,
    MovementType,
    Qty,
    UnitCost,
    SourceType,
    SourceId,
    ActorId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StockDocuments {
    Table,
    Id,
    CompanyId,
    BranchId,
    SourceType,
    SourceId,
    Status,
    SubmittedAt,
    SubmittedBy,
    PostedAt,
    PostedBy,
    Projections,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChartOfAccounts {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountingJournals {
    Table,
    Id,
    CompanyId,
    BranchId,
    SourceType,
    SourceId,
    Status,
    Memo,
    TotalDebit,
    TotalCredit,
    ReversalOf,
    VoidReason,
    VoidedAt,
    VoidedBy,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountingJournalLines {
    Table,
    Id,
    JournalId,
    CompanyId,
    LineNo,
    AccountId,
    AccountCode,
    Side,
    Amount,
    LotId,
    MovementId,
    Memo,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IdempotencyRecords {
    Table,
    Id,
    CompanyId,
    ActorId,
    IdempotencyKey,
    Method,
    Path,
    RequestHash,
    State,
    ResponseStatus,
    ResponseBody,
    CreatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum InventoryAuditEvents {
    Table,
    Id,
    CompanyId,
    BranchId,
    ActorId,
    ItemId,
    ItemsChecked,
    ItemMismatches,
    LotMismatches,
    FixApplied,
    Detail,
    CreatedAt,
}

const RLS_SQL: &str = r"
-- ============================================================
-- ROW LEVEL SECURITY
-- Every tenant table is filtered by app.current_company_id,
-- which ScopedTransaction sets with SET LOCAL.
-- ============================================================

ALTER TABLE inventory_items ENABLE ROW LEVEL SECURITY;
ALTER TABLE inventory_lots ENABLE ROW LEVEL SECURITY;
ALTER TABLE inventory_movements ENABLE ROW LEVEL SECURITY;
ALTER TABLE stock_documents ENABLE ROW LEVEL SECURITY;
ALTER TABLE chart_of_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE accounting_journals ENABLE ROW LEVEL SECURITY;
ALTER TABLE accounting_journal_lines ENABLE ROW LEVEL SECURITY;
ALTER TABLE idempotency_records ENABLE ROW LEVEL SECURITY;
ALTER TABLE inventory_audit_events ENABLE ROW LEVEL SECURITY;

ALTER TABLE inventory_items FORCE ROW LEVEL SECURITY;
ALTER TABLE inventory_lots FORCE ROW LEVEL SECURITY;
ALTER TABLE inventory_movements FORCE ROW LEVEL SECURITY;
ALTER TABLE stock_documents FORCE ROW LEVEL SECURITY;
ALTER TABLE chart_of_accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE accounting_journals FORCE ROW LEVEL SECURITY;
ALTER TABLE accounting_journal_lines FORCE ROW LEVEL SECURITY;
ALTER TABLE idempotency_records FORCE ROW LEVEL SECURITY;
ALTER TABLE inventory_audit_events FORCE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON inventory_items
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON inventory_lots
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON inventory_movements
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON stock_documents
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON chart_of_accounts
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON accounting_journals
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON accounting_journal_lines
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON idempotency_records
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON inventory_audit_events
    USING (company_id = NULLIF(current_setting('app.current_company_id', true), '')::UUID);
";
