//! Replay protection for mutating calls.
//!
//! The database-backed guard lives in `larder-db`; this module holds the
//! request fingerprint and the rules deciding between reserve, replay,
//! reclaim, and rejection.

pub mod error;
pub mod fingerprint;
pub mod policy;

pub use error::{GuardError, IdempotencyError};
pub use fingerprint::{IdempotentRequest, canonical_json, fingerprint};
pub use policy::{Decision, IdempotencyPolicy, IdempotentResponse, RecordState, RecordView};
