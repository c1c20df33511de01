//! Deposit escrow with pull-based withdrawal.
//!
//! Referral payouts are not pushed to agents. They accumulate here and each
//! agent pulls its own balance with [`DepositEscrow::withdraw`], which hands
//! the funds to an external [`PayoutSink`].
//!
//! # Withdrawal ordering
//!
//! 1. Mark the calling thread as withdrawing. The mark is held until the
//!    withdrawal returns, so a nested withdrawal started by the sink, for any
//!    agent, fails with [`EscrowError::Reentrant`].
//! 2. Read the caller's balance and zero it.
//! 3. Call the sink.
//! 4. If the sink fails, put the balance back and report the failure.
//!
//! Withdrawals on different threads do not block each other. The balance is
//! zeroed under the lock before the sink runs, so two concurrent withdrawals
//! of the same agent pay out once between them.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{info, warn};

use hrs_types::{AgentId, Amount, Credit};

use crate::LedgerError;
use crate::points::stage;

// ---------------------------------------------------------------------------
// Payout sink
// ---------------------------------------------------------------------------

/// Failure reported by a [`PayoutSink`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payout to {to} failed: {reason}")]
pub struct PayoutError {
    /// Intended recipient.
    pub to: AgentId,
    /// Why the transfer failed.
    pub reason: String,
}

/// Destination through which withdrawn funds leave the system.
///
/// Implementations may call back into the escrow; such nested withdrawals
/// are rejected.
pub trait PayoutSink {
    /// Move `amount` out of the system to `to`.
    fn transfer(&self, to: AgentId, amount: Amount) -> Result<(), PayoutError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`DepositEscrow::withdraw`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscrowError {
    /// A withdrawal was attempted while another one was transferring.
    #[error("reentrant withdrawal by {agent} rejected")]
    Reentrant {
        /// The agent attempting the nested withdrawal.
        agent: AgentId,
    },

    /// The sink refused the transfer; the balance was restored.
    #[error("transfer of {amount} to {agent} failed: {source}")]
    TransferFailed {
        /// The withdrawing agent.
        agent: AgentId,
        /// The amount that could not be paid out.
        amount: Amount,
        /// The sink's error.
        source: PayoutError,
    },

    /// Restoring the balance after a failed transfer overflowed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Reentrancy guard
// ---------------------------------------------------------------------------

/// Marks the current thread as inside a withdrawal for its lifetime.
struct ReentrancyGuard<'a> {
    active: &'a Mutex<HashSet<ThreadId>>,
    thread: ThreadId,
}

impl<'a> ReentrancyGuard<'a> {
    /// Mark the current thread, or `None` if it is already withdrawing.
    fn acquire(active: &'a Mutex<HashSet<ThreadId>>) -> Option<Self> {
        let thread = thread::current().id();
        let inserted = lock(active).insert(thread);
        inserted.then(|| Self { active, thread })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        lock(self.active).remove(&self.thread);
    }
}

/// Every guarded map is updated in a single step, so a poisoned lock never
/// guards a half-applied change and can be recovered.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// DepositEscrow
// ---------------------------------------------------------------------------

/// Per-agent withdrawable balances.
///
/// All methods take `&self` so that a payout sink holding a shared handle
/// can call back in during a transfer.
#[derive(Debug, Default)]
pub struct DepositEscrow {
    balances: Mutex<BTreeMap<AgentId, Amount>>,
    withdrawing: Mutex<HashSet<ThreadId>>,
}

impl DepositEscrow {
    /// Create an empty escrow.
    pub fn new() -> Self {
        Self::default()
    }

    fn balances(&self) -> MutexGuard<'_, BTreeMap<AgentId, Amount>> {
        lock(&self.balances)
    }

    /// Withdrawable balance of `agent`; zero if never credited.
    pub fn deposits_of(&self, agent: AgentId) -> Amount {
        self.balances().get(&agent).copied().unwrap_or(0)
    }

    /// Sum of all balances held, `None` on overflow.
    pub fn total_held(&self) -> Option<Amount> {
        self.balances()
            .values()
            .try_fold(Amount::MIN, |acc, v| acc.checked_add(*v))
    }

    /// Whether any thread is inside a withdrawal.
    pub fn is_withdrawing(&self) -> bool {
        !lock(&self.withdrawing).is_empty()
    }

    /// Apply a batch of credits atomically.
    ///
    /// This is the minting path: only the owner of the escrow may call it,
    /// after computing a distribution that conserves the paid amount.
    pub fn credit_all(&self, credits: &[Credit]) -> Result<(), LedgerError> {
        let mut balances = self.balances();
        let staged = stage(&balances, credits)?;
        balances.extend(staged);
        Ok(())
    }

    /// Pay out the whole balance of `agent` through `sink`.
    ///
    /// Returns the amount transferred, which is zero when the agent has
    /// nothing in escrow (the sink is not called in that case).
    pub fn withdraw(&self, agent: AgentId, sink: &dyn PayoutSink) -> Result<Amount, EscrowError> {
        let Some(_guard) = ReentrancyGuard::acquire(&self.withdrawing) else {
            warn!(%agent, "Reentrant withdrawal rejected");
            return Err(EscrowError::Reentrant { agent });
        };

        let amount = self
            .balances()
            .get_mut(&agent)
            .map(core::mem::take)
            .unwrap_or(0);
        if amount == 0 {
            return Ok(0);
        }

        if let Err(source) = sink.transfer(agent, amount) {
            self.credit_all(&[Credit::new(agent, amount)])?;
            warn!(%agent, amount, error = %source, "Withdrawal transfer failed, balance restored");
            return Err(EscrowError::TransferFailed {
                agent,
                amount,
                source,
            });
        }

        info!(%agent, amount, "Escrow withdrawn");
        Ok(amount)
    }
}
