//! `SeaORM` entity definitions for the inventory ledger schema.
//!
//! Quantities, unit costs and amounts are stored as canonical fixed-point
//! strings and parsed through `larder_shared::types` on the way out.

pub mod prelude;

pub mod accounting_journal_lines;
pub mod accounting_journals;
pub mod chart_of_accounts;
pub mod idempotency_records;
pub mod inventory_audit_events;
pub mod inventory_items;
pub mod inventory_lots;
pub mod inventory_movements;
pub mod sea_orm_active_enums;
pub mod stock_documents;
