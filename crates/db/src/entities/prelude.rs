//! Entity prelude.

pub use super::accounting_journal_lines::Entity as AccountingJournalLines;
pub use super::accounting_journals::Entity as AccountingJournals;
pub use super::chart_of_accounts::Entity as ChartOfAccounts;
pub use super::idempotency_records::Entity as IdempotencyRecords;
pub use super::inventory_audit_events::Entity as InventoryAuditEvents;
pub use super::inventory_items::Entity as InventoryItems;
pub use super::inventory_lots::Entity as InventoryLots;
pub use super::inventory_movements::Entity as InventoryMovements;
pub use super::stock_documents::Entity as StockDocuments;
