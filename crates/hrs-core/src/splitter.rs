//! Referral split of a subscription payment.
//!
//! Starting at the referred agent, each non-root agent on the chain takes
//! 80% (floored) of what is still undistributed and passes the rest up.
//! The root takes everything that reaches it, including all truncation
//! residue, so the credits always sum to the price.
//!
//! ```text
//! split(F, 1_000_000) on F -> D -> B -> A
//!   F: 800_000   D: 160_000   B: 32_000   A: 8_000
//! ```

use tracing::debug;

use hrs_types::{AgentId, Amount, Credit};
use hrs_ledger::conservation::{self, ConservationResult};

use crate::error::HrsError;
use crate::graph::HierarchyGraph;

/// Share kept at each non-root hop, as a fraction `NUMERATOR / DENOMINATOR`.
pub const SHARE_NUMERATOR: Amount = 80;

/// See [`SHARE_NUMERATOR`].
pub const SHARE_DENOMINATOR: Amount = 100;

/// `floor(remaining * NUMERATOR / DENOMINATOR)` without the intermediate
/// product, so every `Amount` has a share.
const fn share_of(remaining: Amount) -> Amount {
    let whole = remaining / SHARE_DENOMINATOR;
    let rest = remaining % SHARE_DENOMINATOR;
    whole
        .saturating_mul(SHARE_NUMERATOR)
        .saturating_add(rest.saturating_mul(SHARE_NUMERATOR) / SHARE_DENOMINATOR)
}

/// Compute the escrow credits of distributing `price` from `referred_agent`.
///
/// Zero shares produce no credit. Pure: the graph is only read.
pub fn referral_split(
    graph: &HierarchyGraph,
    referred_agent: AgentId,
    price: Amount,
) -> Result<Vec<Credit>, HrsError> {
    let mut credits = Vec::new();
    let mut remaining = price;

    for current in graph.chain(referred_agent)? {
        let share = if graph.superior_of(current)?.is_some() {
            share_of(remaining)
        } else {
            remaining
        };
        debug!(agent = %current, share, remaining, "Referral hop");
        if share > 0 {
            credits.push(Credit::new(current, share));
        }
        remaining = remaining
            .checked_sub(share)
            .ok_or_else(|| HrsError::overflow("referral remainder underflow"))?;
    }

    if let ConservationResult::Anomaly(anomaly) = conservation::verify_distribution(price, &credits) {
        return Err(HrsError::DistributionAnomaly {
            message: anomaly.message,
        });
    }
    Ok(credits)
}
