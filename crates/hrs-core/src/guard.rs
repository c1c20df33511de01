//! Principal-only access control.

use tracing::warn;

use hrs_types::AgentId;

use crate::error::HrsError;

/// Holds the single identity allowed to mutate structure and catalog.
///
/// The principal is fixed at construction; there is no rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGuard {
    principal: AgentId,
}

impl AccessGuard {
    /// Create a guard for `principal`.
    pub const fn new(principal: AgentId) -> Self {
        Self { principal }
    }

    /// The principal identity.
    pub const fn principal(&self) -> AgentId {
        self.principal
    }

    /// Whether `caller` is the principal.
    pub fn is_principal(&self, caller: AgentId) -> bool {
        caller == self.principal
    }

    /// Fail with [`HrsError::Unauthorized`] unless `caller` is the principal.
    ///
    /// Call this before any validation that could mutate state.
    pub fn require_principal(&self, caller: AgentId, operation: &'static str) -> Result<(), HrsError> {
        if self.is_principal(caller) {
            Ok(())
        } else {
            warn!(%caller, operation, "Principal-only operation denied");
            Err(HrsError::Unauthorized { caller })
        }
    }
}
