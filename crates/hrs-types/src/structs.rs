//! Core data structures shared across the workspace.
//!
//! Everything here is plain data: validation of the hierarchy lives in
//! `hrs-core`, balance bookkeeping in `hrs-ledger`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{AgentId, PolicyId};

/// A non-negative quantity of points or currency in its smallest unit.
pub type Amount = u128;

/// Rank of an agent. Independent of tree depth.
pub type Level = u32;

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// One agent record in the hierarchy arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HierarchyNode {
    /// Direct superior, `None` only for the root.
    pub superior: Option<AgentId>,
    /// Direct inferiors.
    pub inferiors: BTreeSet<AgentId>,
    /// Current level.
    pub level: Level,
}

impl HierarchyNode {
    /// A node with no links at the given level.
    pub const fn detached(level: Level) -> Self {
        Self {
            superior: None,
            inferiors: BTreeSet::new(),
            level,
        }
    }
}

/// Initial hierarchy as supplied by a deployment.
///
/// The two adjacency views must describe the same tree; construction of a
/// `HierarchyGraph` cross-checks them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HierarchySnapshot {
    /// Each superior with the full list of its direct inferiors.
    #[serde(default)]
    pub superior_to_inferiors: Vec<(AgentId, Vec<AgentId>)>,
    /// Each non-root agent with its direct superior.
    #[serde(default)]
    pub inferior_to_superior: Vec<(AgentId, AgentId)>,
    /// Every agent with its level.
    #[serde(default)]
    pub levels: Vec<(AgentId, Level)>,
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// A single credit produced by a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Credit {
    /// Receiving agent.
    pub agent: AgentId,
    /// Credited amount.
    pub amount: Amount,
}

impl Credit {
    /// Shorthand constructor.
    pub const fn new(agent: AgentId, amount: Amount) -> Self {
        Self { agent, amount }
    }
}

// ---------------------------------------------------------------------------
// Catalog and subscriptions
// ---------------------------------------------------------------------------

/// A named, priced product that agents can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Policy {
    /// Catalog-assigned id.
    pub id: PolicyId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Price in the smallest currency unit.
    pub price: Amount,
    /// Length of a subscription to this policy, in seconds.
    pub term_seconds: u64,
}

/// The active subscription of a single subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Subscription {
    /// Paying agent.
    pub subscriber: AgentId,
    /// Subscribed policy.
    pub policy_id: PolicyId,
    /// Agent whose referral chain received the payment.
    pub referred_agent: AgentId,
    /// When the subscription was purchased.
    pub started_at: DateTime<Utc>,
    /// First instant at which the subscription is no longer active.
    pub expires_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription is still active at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_from_pairs() {
        let a = AgentId::new();
        let b = AgentId::new();
        let json = serde_json::json!({
            "superior_to_inferiors": [[a, [b]]],
            "inferior_to_superior": [[b, a]],
            "levels": [[a, 0], [b, 1]],
        });
        let snapshot: Result<HierarchySnapshot, _> = serde_json::from_value(json);
        let snapshot = snapshot.ok();
        assert_eq!(
            snapshot.map(|s| s.levels),
            Some(vec![(a, 0), (b, 1)]),
        );
    }

    #[test]
    fn subscription_expires_at_boundary() {
        let start = Utc::now();
        let sub = Subscription {
            subscriber: AgentId::new(),
            policy_id: PolicyId(0),
            referred_agent: AgentId::new(),
            started_at: start,
            expires_at: start + chrono::Duration::seconds(10),
        };
        assert!(sub.is_active_at(start));
        assert!(!sub.is_active_at(sub.expires_at));
    }
}
