//! Principal-managed catalog of priced policies.

use tracing::info;

use hrs_types::{AgentId, Amount, Policy, PolicyId};

use crate::error::HrsError;
use crate::guard::AccessGuard;

/// Input for registering a policy with an explicit subscription term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Price in the smallest currency unit.
    pub price: Amount,
    /// Subscription length in seconds.
    pub term_seconds: u64,
}

/// Append-only list of policies, ids assigned sequentially from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCatalog {
    policies: Vec<Policy>,
    next_id: PolicyId,
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            policies: Vec::new(),
            next_id: PolicyId(0),
        }
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policy has been registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// The policy with `id`.
    pub fn policy_at(&self, id: PolicyId) -> Result<&Policy, HrsError> {
        self.policies
            .iter()
            .find(|p| p.id == id)
            .ok_or(HrsError::UnknownPolicy(id))
    }

    /// All policies in registration order.
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Append a policy on behalf of the principal.
    pub fn register(
        &mut self,
        guard: &AccessGuard,
        caller: AgentId,
        draft: PolicyDraft,
    ) -> Result<&Policy, HrsError> {
        guard.require_principal(caller, "register_new_policy")?;
        let id = self.next_id;
        let next_id = id
            .next()
            .ok_or_else(|| HrsError::overflow("policy id sequence exhausted"))?;

        let policy = Policy {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            term_seconds: draft.term_seconds,
        };
        info!(
            policy_id = %policy.id,
            name = %policy.name,
            price = policy.price,
            term_seconds = policy.term_seconds,
            "Policy registered"
        );

        self.next_id = next_id;
        self.policies.push(policy);
        self.policies
            .last()
            .ok_or_else(|| HrsError::overflow("failed to retrieve policy after append"))
    }
}
