//! Balance bookkeeping for the HRS hierarchical reward system.
//!
//! Two independent balance stores live here:
//!
//! - [`PointsLedger`] -- bonus points credited by the reward cascade.
//! - [`DepositEscrow`] -- withdrawable currency credited by the payment
//!   splitter and paid out through a [`PayoutSink`].
//!
//! Both create an entry lazily on first credit and apply batches of
//! [`Credit`]s atomically: a batch in which any single credit would
//! overflow is rejected as a whole.
//!
//! # Conservation
//!
//! A distribution of an amount `A` into credits must satisfy
//!
//! ```text
//! sum(credits) == A
//! ```
//!
//! [`conservation::verify_distribution`] checks this before a split is
//! committed to the escrow.
//!
//! # Usage
//!
//! ```
//! use hrs_ledger::PointsLedger;
//! use hrs_types::{AgentId, Credit};
//!
//! let mut points = PointsLedger::new();
//! let agent = AgentId::new();
//! points.apply(&[Credit::new(agent, 1000)]).ok();
//! assert_eq!(points.points_of(agent), 1000);
//! ```
//!
//! [`Credit`]: hrs_types::Credit

pub mod conservation;
pub mod escrow;
pub mod points;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use escrow::{DepositEscrow, EscrowError, PayoutError, PayoutSink};
pub use points::PointsLedger;

use hrs_types::{AgentId, Amount};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when crediting a balance store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A credit would push a balance past [`Amount::MAX`].
    #[error("balance overflow crediting {amount} to {agent} (current balance {balance})")]
    BalanceOverflow {
        /// The agent being credited.
        agent: AgentId,
        /// Its balance before the batch.
        balance: Amount,
        /// The amount that could not be added.
        amount: Amount,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A distribution whose credits do not add up to the distributed amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionAnomaly {
    /// The amount that was being distributed.
    pub expected: Amount,
    /// Sum of the produced credits, `None` if the sum itself overflowed.
    pub actual: Option<Amount>,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for DistributionAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
