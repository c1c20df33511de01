//! Bonus points ledger.
//!
//! Points only ever grow: the reward cascade is the sole writer and there
//! is no spending operation.

use std::collections::BTreeMap;

use hrs_types::{AgentId, Amount, Credit};

use crate::LedgerError;

/// Per-agent bonus points balances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsLedger {
    balances: BTreeMap<AgentId, Amount>,
}

impl PointsLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    /// Points held by `agent`; zero if it was never credited.
    pub fn points_of(&self, agent: AgentId) -> Amount {
        self.balances.get(&agent).copied().unwrap_or(0)
    }

    /// Whether `agent` has ever been credited.
    pub fn has_entry(&self, agent: AgentId) -> bool {
        self.balances.contains_key(&agent)
    }

    /// Number of agents with an entry.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no agent has been credited yet.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Apply a batch of credits atomically.
    ///
    /// An agent may appear several times in `credits`. If any resulting
    /// balance would overflow, nothing is applied.
    pub fn apply(&mut self, credits: &[Credit]) -> Result<(), LedgerError> {
        let staged = stage(&self.balances, credits)?;
        self.balances.extend(staged);
        Ok(())
    }
}

/// Compute the post-batch balance of every touched agent without mutating.
pub(crate) fn stage(
    balances: &BTreeMap<AgentId, Amount>,
    credits: &[Credit],
) -> Result<BTreeMap<AgentId, Amount>, LedgerError> {
    let mut staged: BTreeMap<AgentId, Amount> = BTreeMap::new();
    for credit in credits {
        let current = staged
            .get(&credit.agent)
            .or_else(|| balances.get(&credit.agent))
            .copied()
            .unwrap_or(0);
        let next = current
            .checked_add(credit.amount)
            .ok_or(LedgerError::BalanceOverflow {
                agent: credit.agent,
                balance: current,
                amount: credit.amount,
            })?;
        staged.insert(credit.agent, next);
    }
    Ok(staged)
}
