//! Common types used across the application.

pub mod fixed;
pub mod id;
pub mod scope;

pub use fixed::{Amount, FixedError, Quantity, UnitCost};
pub use id::*;
pub use scope::BranchScope;

#[cfg(test)]
mod fixed_props;
