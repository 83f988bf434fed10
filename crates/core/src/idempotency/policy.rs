//! Decision rules for an incoming key.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::IdempotencyError;

/// Response stored against a completed key and replayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotentResponse {
    /// HTTP status.
    pub status: u16,
    /// Response body.
    pub body: Value,
}

impl IdempotentResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// State of a stored key.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    /// Reserved, the operation has not finished.
    InProgress,
    /// Finished with this response.
    Completed(IdempotentResponse),
}

/// What the guard knows about an existing key.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    /// Fingerprint of the request that reserved the key.
    pub request_hash: String,
    /// Current state.
    pub state: RecordState,
    /// When the key was reserved.
    pub created_at: DateTime<Utc>,
}

/// Outcome of checking a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No record: reserve the key and run.
    Reserve,
    /// Completed record with a matching hash: return the stored response.
    Replay(IdempotentResponse),
    /// Abandoned in-progress record: delete it, then reserve and run.
    Reclaim,
}

/// Idempotency rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyPolicy {
    /// Age after which an in-progress record counts as abandoned.
    pub stale_after: Duration,
}

impl Default for IdempotencyPolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::seconds(300),
        }
    }
}

impl IdempotencyPolicy {
    /// Policy with a staleness threshold in seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self {
            stale_after: i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Decides what to do with a request whose key may already exist.
    ///
    /// A hash mismatch is a conflict whatever the record's state.
    pub fn decide(
        &self,
        key: &str,
        existing: Option<&RecordView>,
        request_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Decision, IdempotencyError> {
        let Some(record) = existing else {
            return Ok(Decision::Reserve);
        };

        if record.request_hash != request_hash {
            return Err(IdempotencyError::Conflict {
                key: key.to_string(),
            });
        }

        match &record.state {
            RecordState::Completed(response) => Ok(Decision::Replay(response.clone())),
            RecordState::InProgress if self.is_stale(record.created_at, now) => {
                Ok(Decision::Reclaim)
            }
            RecordState::InProgress => Err(IdempotencyError::InProgress {
                key: key.to_string(),
            }),
        }
    }

    /// Whether a reservation made at `created_at` is abandoned at `now`.
    #[must_use]
    pub fn is_stale(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created_at > self.stale_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn record(hash: &str, state: RecordState, age_secs: i64, now: DateTime<Utc>) -> RecordView {
        RecordView {
            request_hash: hash.to_string(),
            state,
            created_at: now - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_new_key_reserves() {
        let policy = IdempotencyPolicy::default();
        assert_eq!(
            policy.decide("k", None, "h", Utc::now()).unwrap(),
            Decision::Reserve
        );
    }

    #[test]
    fn test_completed_replays() {
        let now = Utc::now();
        let response = IdempotentResponse::new(201, json!({"id": 1}));
        let existing = record("h", RecordState::Completed(response.clone()), 10_000, now);
        let decision = IdempotencyPolicy::default()
            .decide("k", Some(&existing), "h", now)
            .unwrap();
        assert_eq!(decision, Decision::Replay(response));
    }

    #[rstest]
    #[case(RecordState::InProgress)]
    #[case(RecordState::Completed(IdempotentResponse::new(200, json!(null))))]
    fn test_hash_mismatch_conflicts(#[case] state: RecordState) {
        let now = Utc::now();
        let existing = record("h1", state, 1, now);
        let err = IdempotencyPolicy::default()
            .decide("k", Some(&existing), "h2", now)
            .unwrap_err();
        assert!(matches!(err, IdempotencyError::Conflict { .. }));
    }

    #[rstest]
    #[case(10, false)]
    #[case(300, false)]
    #[case(301, true)]
    fn test_in_progress_staleness(#[case] age_secs: i64, #[case] stale: bool) {
        let now = Utc::now();
        let existing = record("h", RecordState::InProgress, age_secs, now);
        let result = IdempotencyPolicy::default().decide("k", Some(&existing), "h", now);
        if stale {
            assert_eq!(result.unwrap(), Decision::Reclaim);
        } else {
            assert!(matches!(result, Err(IdempotencyError::InProgress { .. })));
        }
    }

    #[test]
    fn test_from_secs() {
        assert_eq!(
            IdempotencyPolicy::from_secs(60).stale_after,
            Duration::seconds(60)
        );
    }
}
