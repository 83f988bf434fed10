//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Posting, journal and audit operations each run in one scoped transaction;
//! the `*_in` helpers let them share locks inside it.

mod convert;

pub mod account;
pub mod document;
pub mod idempotency;
pub mod inventory;
pub mod journal;
pub mod posting;

pub use account::AccountRepository;
pub use document::{DocumentRepository, StockDocument};
pub use idempotency::IdempotencyGuard;
pub use inventory::{InventoryRepository, StockItem};
pub use journal::{JournalRepository, JournalWithLines, VoidResult};
pub use posting::PostingRepository;
