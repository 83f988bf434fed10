//! The verified tenant/branch handle every ledger operation requires.

use serde::{Deserialize, Serialize};

use super::id::{BranchId, CompanyId, UserId};

/// A company + branch pair already checked by the boundary, plus the actor.
///
/// Ledger operations take a `&BranchScope` instead of loose IDs, so a query
/// can't be written without its tenant and branch filters at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchScope {
    company_id: CompanyId,
    branch_id: BranchId,
    actor_id: UserId,
}

impl BranchScope {
    /// Builds the handle once the caller has verified that `branch_id`
    /// belongs to `company_id` and that `actor_id` may act on it.
    #[must_use]
    pub const fn verified(company_id: CompanyId, branch_id: BranchId, actor_id: UserId) -> Self {
        Self {
            company_id,
            branch_id,
            actor_id,
        }
    }

    /// Tenant company.
    #[must_use]
    pub const fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Branch inside the company.
    #[must_use]
    pub const fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Acting user, recorded on movements, journals and audit events.
    #[must_use]
    pub const fn actor_id(&self) -> UserId {
        self.actor_id
    }

    /// Same tenant and branch, different actor.
    #[must_use]
    pub const fn with_actor(self, actor_id: UserId) -> Self {
        Self { actor_id, ..self }
    }
}
