//! Error types for the hrs-core crate.
//!
//! Every operation on the organization returns [`HrsError`] on failure and
//! leaves all state exactly as it was before the call.

use hrs_types::{AgentId, Amount, PolicyId};

use hrs_ledger::{EscrowError, LedgerError};

use crate::config::ConfigError;

/// Errors that can occur during organization operations.
#[derive(Debug, thiserror::Error)]
pub enum HrsError {
    /// The caller is not the principal.
    #[error("unauthorized: {caller} is not the principal")]
    Unauthorized {
        /// The rejected caller.
        caller: AgentId,
    },

    /// The agent is not registered in the hierarchy.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// No policy with this id exists in the catalog.
    #[error("unknown policy: {0}")]
    UnknownPolicy(PolicyId),

    /// The construction snapshot does not describe a single consistent tree.
    #[error("inconsistent hierarchy: {reason}")]
    InconsistentHierarchy {
        /// Which consistency check failed.
        reason: String,
    },

    /// The relink would make an agent its own ancestor.
    #[error("cycle: {new_superior} cannot become the superior of {agent}")]
    Cycle {
        /// The agent being relinked.
        agent: AgentId,
        /// The rejected superior (the agent itself or one of its descendants).
        new_superior: AgentId,
    },

    /// The payment does not cover the policy price.
    #[error("insufficient payment: price is {price}, received {payment}")]
    InsufficientPayment {
        /// Policy price.
        price: Amount,
        /// Amount paid.
        payment: Amount,
    },

    /// A withdrawal could not be completed; the balance is unchanged.
    #[error("withdrawal failed for {agent}: {source}")]
    WithdrawalFailed {
        /// The withdrawing agent.
        agent: AgentId,
        /// Why the escrow refused or the transfer failed.
        source: EscrowError,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A computed split does not sum to the distributed amount.
    #[error("distribution anomaly: {message}")]
    DistributionAnomaly {
        /// What the conservation check found.
        message: String,
    },

    /// A balance store rejected a credit batch.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

impl HrsError {
    /// Build an [`HrsError::InconsistentHierarchy`] from any message.
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentHierarchy {
            reason: reason.into(),
        }
    }

    /// Build an [`HrsError::ArithmeticOverflow`] from any message.
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }
}
