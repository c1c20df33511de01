//! Geometric bonus cascade.
//!
//! The rewarded agent receives the full amount. Its superior receives one
//! fifth of that, the next superior one fifth of the previous portion, and
//! so on. Every step is integer floor division; a remainder is dropped, not
//! carried. The walk stops at the root or as soon as a portion reaches zero.
//!
//! ```text
//! reward(F, 1000) on F -> D -> B -> A
//!   F: 1000   D: 200   B: 40   A: 8
//! ```

use tracing::debug;

use hrs_types::{AgentId, Amount, Credit};

use crate::error::HrsError;
use crate::graph::HierarchyGraph;

/// Each hop up receives `1 / DECAY_DIVISOR` of the previous portion.
pub const DECAY_DIVISOR: Amount = 5;

/// Compute the credits of rewarding `agent` with `amount`.
///
/// The first credit is always the rewarded agent itself, even for a zero
/// amount. Pure: the graph is only read.
pub fn reward_cascade(
    graph: &HierarchyGraph,
    agent: AgentId,
    amount: Amount,
) -> Result<Vec<Credit>, HrsError> {
    let mut credits = vec![Credit::new(agent, amount)];
    let mut portion = amount / DECAY_DIVISOR;

    for superior in graph.ancestors(agent)? {
        if portion == 0 {
            break;
        }
        debug!(%superior, portion, "Cascade hop");
        credits.push(Credit::new(superior, portion));
        portion /= DECAY_DIVISOR;
    }

    Ok(credits)
}
