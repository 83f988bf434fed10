//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `LotId` where an `ItemId` is expected.
//! IDs are ordered so callers can lock rows in a stable sequence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a tenant company.");
typed_id!(BranchId, "Unique identifier for a branch (kitchen/outlet) of a company.");
typed_id!(UserId, "Unique identifier for an acting user.");
typed_id!(ItemId, "Unique identifier for an inventory item.");
typed_id!(LotId, "Unique identifier for an inventory lot (cost layer).");
typed_id!(MovementId, "Unique identifier for an inventory movement.");
typed_id!(DocumentId, "Unique identifier for a stock document.");
typed_id!(JournalId, "Unique identifier for an accounting journal.");
typed_id!(JournalLineId, "Unique identifier for an accounting journal line.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(AuditEventId, "Unique identifier for an inventory audit event.");
typed_id!(
    IdempotencyRecordId,
    "Unique identifier for an idempotency record."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = ItemId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_typed_id_from_str() {
        let uuid = Uuid::new_v4();
        let id = LotId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.into_inner(), uuid);
        assert!(LotId::from_str("invalid").is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&CompanyId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
