//! Notifications emitted by the organization after a successful mutation.
//!
//! Listeners receive these over the notification hub and typically log
//! them. They are serialized with a `kind` tag, e.g.
//!
//! ```json
//! { "kind": "promoted", "agent": "...", "new_level": 1, "new_superior": "..." }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AgentId;
use crate::structs::{Amount, Credit, Level, Policy, Subscription};

/// A state change that external listeners can observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// An agent was moved under a new superior and assigned a new level.
    Promoted {
        /// The promoted agent.
        agent: AgentId,
        /// Level after promotion.
        new_level: Level,
        /// Superior after promotion.
        new_superior: AgentId,
    },
    /// An agent was moved under a new superior, level untouched.
    SuperiorChanged {
        /// The moved agent.
        agent: AgentId,
        /// Superior before the move.
        old_superior: Option<AgentId>,
        /// Superior after the move.
        new_superior: AgentId,
    },
    /// An agent's level changed, relationships untouched.
    LevelChanged {
        /// The agent.
        agent: AgentId,
        /// Level before the change.
        old_level: Level,
        /// Level after the change.
        new_level: Level,
    },
    /// A bonus cascade was credited to the points ledger.
    Rewarded {
        /// Who invoked the reward.
        caller: AgentId,
        /// The rewarded agent.
        agent: AgentId,
        /// Amount credited to the rewarded agent itself.
        amount: Amount,
        /// Every credit applied, starting with the rewarded agent.
        credits: Vec<Credit>,
    },
    /// The principal added a policy to the catalog.
    PolicyRegistered {
        /// The new policy.
        policy: Policy,
    },
    /// A subscription was purchased and its price split into escrow.
    Subscribed {
        /// The recorded subscription.
        subscription: Subscription,
        /// Escrow credits along the referral chain.
        credits: Vec<Credit>,
        /// Overpayment returned to the payer.
        refund: Amount,
    },
    /// An agent withdrew its escrow balance.
    Withdrawn {
        /// The withdrawing agent.
        agent: AgentId,
        /// Amount paid out.
        amount: Amount,
    },
}

impl Notification {
    /// Short machine name of the notification, matching the serde tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Promoted { .. } => "promoted",
            Self::SuperiorChanged { .. } => "superior_changed",
            Self::LevelChanged { .. } => "level_changed",
            Self::Rewarded { .. } => "rewarded",
            Self::PolicyRegistered { .. } => "policy_registered",
            Self::Subscribed { .. } => "subscribed",
            Self::Withdrawn { .. } => "withdrawn",
        }
    }
}
