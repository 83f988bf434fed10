//! Shared types, errors, and configuration for Larder.
//!
//! This crate provides common types used across all other crates:
//! - Fixed-point quantity, unit cost, and amount types
//! - Typed IDs for type-safe entity references
//! - The verified `BranchScope` handle
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
