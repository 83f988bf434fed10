//! Core business logic for Larder.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `stock` - Items, lots, movements, FIFO allocation, projection audits
//! - `posting` - Source documents, posting inputs, and typed posting results
//! - `journal` - Journal derivation and reversal
//! - `idempotency` - Request fingerprints and replay decisions
//! - `error` - The `StockError` taxonomy

pub mod error;
pub mod idempotency;
pub mod journal;
pub mod posting;
pub mod stock;

pub use error::StockError;
