//! The organization facade: every externally callable operation.
//!
//! Each mutating operation follows the same sequence:
//!
//! 1. Authorize the caller (principal-only operations).
//! 2. Validate and compute the full effect without touching state.
//! 3. Commit the effect in a single step that cannot partially fail.
//! 4. Publish a [`Notification`].
//!
//! A failure in steps 1-3 leaves the organization exactly as it was.
//!
//! Mutations other than [`Organization::withdraw`] take `&mut self`, so
//! they are serialized by the borrow checker. Withdrawal takes `&self`
//! because funds leave through an external [`PayoutSink`] that may hold a
//! shared handle to the organization and call back in.
//!
//! The escrow itself is never handed out. Balances grow only through
//! [`Organization::register_new_subscription`] and shrink only through
//! [`Organization::withdraw`]:
//!
//! ```compile_fail
//! use hrs_core::Organization;
//! use hrs_types::{AgentId, Credit};
//!
//! fn mint(org: &Organization, agent: AgentId) {
//!     let _ = org.escrow().credit_all(&[Credit::new(agent, 1_000_000)]);
//! }
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};

use hrs_ledger::{DepositEscrow, PayoutSink, PointsLedger};
use hrs_types::{
    AgentId, Amount, Credit, HierarchySnapshot, Level, Notification, Policy, PolicyId,
    Subscription,
};

use crate::cascade::reward_cascade;
use crate::catalog::{PolicyCatalog, PolicyDraft};
use crate::config::HrsConfig;
use crate::error::HrsError;
use crate::graph::HierarchyGraph;
use crate::guard::AccessGuard;
use crate::notify::{DEFAULT_CAPACITY, NotificationHub};
use crate::promotion::PromotionEngine;
use crate::splitter::referral_split;
use crate::subscriptions::SubscriptionLedger;

// ---------------------------------------------------------------------------
// Settings and parameter types
// ---------------------------------------------------------------------------

/// Tunables fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationSettings {
    /// Term given to policies registered without an explicit one.
    pub default_term_seconds: u64,
    /// Restrict `reward` to the principal.
    pub require_principal_for_rewards: bool,
    /// Notification channel capacity.
    pub notification_capacity: usize,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            default_term_seconds: 30 * 86_400,
            require_principal_for_rewards: false,
            notification_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&HrsConfig> for OrganizationSettings {
    fn from(config: &HrsConfig) -> Self {
        Self {
            default_term_seconds: config.subscriptions.default_term_seconds(),
            require_principal_for_rewards: config.rewards.require_principal,
            notification_capacity: config.notifications.capacity,
        }
    }
}

/// A subscription purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    /// The paying caller; becomes the subscriber.
    pub payer: AgentId,
    /// Policy being bought.
    pub policy_id: PolicyId,
    /// Agent whose referral chain is paid.
    pub referred_agent: AgentId,
    /// Amount sent with the purchase.
    pub payment: Amount,
    /// Purchase time; the subscription runs from here.
    pub now: DateTime<Utc>,
}

/// Outcome of a successful subscription purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionReceipt {
    /// The stored subscription.
    pub subscription: Subscription,
    /// Escrow credits along the referral chain; they sum to the price.
    pub credits: Vec<Credit>,
    /// Overpayment to hand back to the payer.
    pub refund: Amount,
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// The hierarchical organization and its two distribution ledgers.
#[derive(Debug)]
pub struct Organization {
    owner: AgentId,
    guard: AccessGuard,
    graph: HierarchyGraph,
    points: PointsLedger,
    escrow: DepositEscrow,
    catalog: PolicyCatalog,
    subscriptions: SubscriptionLedger,
    hub: NotificationHub,
    settings: OrganizationSettings,
}

impl Organization {
    /// Construct from a deployment snapshot.
    ///
    /// Fails with [`HrsError::InconsistentHierarchy`] if the snapshot does
    /// not describe a single consistent tree.
    pub fn new(
        snapshot: &HierarchySnapshot,
        owner: AgentId,
        principal: AgentId,
        settings: OrganizationSettings,
    ) -> Result<Self, HrsError> {
        let graph = HierarchyGraph::from_snapshot(snapshot)?;
        info!(
            %owner,
            %principal,
            root = %graph.root(),
            agents = graph.len(),
            "Organization constructed"
        );
        Ok(Self {
            owner,
            guard: AccessGuard::new(principal),
            graph,
            points: PointsLedger::new(),
            escrow: DepositEscrow::new(),
            catalog: PolicyCatalog::new(),
            subscriptions: SubscriptionLedger::new(),
            hub: NotificationHub::new(settings.notification_capacity),
            settings,
        })
    }

    /// Construct from a loaded configuration.
    pub fn from_config(config: &HrsConfig) -> Result<Self, HrsError> {
        Self::new(
            &config.deployment.hierarchy,
            config.deployment.owner,
            config.deployment.principal,
            OrganizationSettings::from(config),
        )
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The deployer identity.
    pub const fn get_owner(&self) -> AgentId {
        self.owner
    }

    /// The principal identity.
    pub const fn principal(&self) -> AgentId {
        self.guard.principal()
    }

    /// Settings fixed at construction.
    pub const fn settings(&self) -> &OrganizationSettings {
        &self.settings
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Read-only view of the hierarchy.
    pub const fn hierarchy(&self) -> &HierarchyGraph {
        &self.graph
    }

    /// Direct superior of `agent`, `None` for the root.
    pub fn get_superior_of(&self, agent: AgentId) -> Result<Option<AgentId>, HrsError> {
        self.graph.superior_of(agent)
    }

    /// Direct inferiors of `agent`.
    pub fn get_inferiors_of(&self, agent: AgentId) -> Result<&BTreeSet<AgentId>, HrsError> {
        self.graph.inferiors_of(agent)
    }

    /// Level of `agent`.
    pub fn get_level_of(&self, agent: AgentId) -> Result<Level, HrsError> {
        self.graph.level_of(agent)
    }

    /// Move `agent` under `new_superior` at `new_level`. Principal only.
    pub fn promote(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_level: Level,
        new_superior: AgentId,
    ) -> Result<(), HrsError> {
        let notification = PromotionEngine::new(&mut self.graph, &self.guard)
            .promote(caller, agent, new_level, new_superior)?;
        self.hub.publish(notification);
        Ok(())
    }

    /// Move `agent` under `new_superior`, level unchanged. Principal only.
    pub fn change_superior(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_superior: AgentId,
    ) -> Result<(), HrsError> {
        let notification = PromotionEngine::new(&mut self.graph, &self.guard)
            .change_superior(caller, agent, new_superior)?;
        self.hub.publish(notification);
        Ok(())
    }

    /// Set the level of `agent`, links unchanged. Principal only.
    pub fn change_level(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_level: Level,
    ) -> Result<(), HrsError> {
        let notification = PromotionEngine::new(&mut self.graph, &self.guard)
            .change_level(caller, agent, new_level)?;
        self.hub.publish(notification);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bonus cascade
    // -----------------------------------------------------------------------

    /// Credit `amount` points to `agent` and cascade a fifth per hop upward.
    ///
    /// Open to any caller unless the organization was configured with
    /// `require_principal_for_rewards`. The caller is recorded in the
    /// notification either way.
    pub fn reward(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        amount: Amount,
    ) -> Result<Vec<Credit>, HrsError> {
        if self.settings.require_principal_for_rewards {
            self.guard.require_principal(caller, "reward")?;
        }
        let credits = reward_cascade(&self.graph, agent, amount)?;
        self.points.apply(&credits)?;

        info!(
            %caller,
            %agent,
            amount,
            hops = credits.len().saturating_sub(1),
            principal = self.guard.is_principal(caller),
            "Reward cascaded"
        );
        self.hub.publish(Notification::Rewarded {
            caller,
            agent,
            amount,
            credits: credits.clone(),
        });
        Ok(credits)
    }

    /// Bonus points held by `agent`.
    pub fn get_points_of(&self, agent: AgentId) -> Amount {
        self.points.points_of(agent)
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Register a policy with the default term. Principal only.
    pub fn register_new_policy(
        &mut self,
        caller: AgentId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Amount,
    ) -> Result<Policy, HrsError> {
        let draft = PolicyDraft {
            name: name.into(),
            description: description.into(),
            price,
            term_seconds: self.settings.default_term_seconds,
        };
        self.register_new_policy_with_term(caller, draft)
    }

    /// Register a policy with an explicit term. Principal only.
    pub fn register_new_policy_with_term(
        &mut self,
        caller: AgentId,
        draft: PolicyDraft,
    ) -> Result<Policy, HrsError> {
        let policy = self.catalog.register(&self.guard, caller, draft)?.clone();
        self.hub.publish(Notification::PolicyRegistered {
            policy: policy.clone(),
        });
        Ok(policy)
    }

    /// The policy with `id`.
    pub fn policy_at(&self, id: PolicyId) -> Result<&Policy, HrsError> {
        self.catalog.policy_at(id)
    }

    /// Number of registered policies.
    pub fn policy_count(&self) -> usize {
        self.catalog.len()
    }

    // -----------------------------------------------------------------------
    // Subscriptions and escrow
    // -----------------------------------------------------------------------

    /// Buy a subscription and split its price into escrow along the
    /// referral chain of `request.referred_agent`.
    ///
    /// Only the price is distributed; any surplus is returned in the
    /// receipt's `refund`.
    pub fn register_new_subscription(
        &mut self,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionReceipt, HrsError> {
        let policy = self.catalog.policy_at(request.policy_id)?;
        let price = policy.price;
        let Some(refund) = request.payment.checked_sub(price) else {
            warn!(
                payer = %request.payer,
                policy_id = %request.policy_id,
                price,
                payment = request.payment,
                "Subscription underpaid"
            );
            return Err(HrsError::InsufficientPayment {
                price,
                payment: request.payment,
            });
        };
        let credits = referral_split(&self.graph, request.referred_agent, price)?;
        let subscription = SubscriptionLedger::draft(
            request.payer,
            policy,
            request.referred_agent,
            request.now,
        )?;

        self.escrow.credit_all(&credits)?;
        self.subscriptions.record(subscription.clone());

        info!(
            payer = %request.payer,
            policy_id = %request.policy_id,
            referred_agent = %request.referred_agent,
            price,
            refund,
            expires_at = %subscription.expires_at,
            "Subscription registered"
        );
        self.hub.publish(Notification::Subscribed {
            subscription: subscription.clone(),
            credits: credits.clone(),
            refund,
        });
        Ok(SubscriptionReceipt {
            subscription,
            credits,
            refund,
        })
    }

    /// The subscription of `agent`, expired or not.
    pub fn subscription_of(&self, agent: AgentId) -> Option<&Subscription> {
        self.subscriptions.subscription_of(agent)
    }

    /// Whether `agent` holds an unexpired subscription at `now`.
    pub fn is_subscription_active(&self, agent: AgentId, now: DateTime<Utc>) -> bool {
        self.subscriptions.is_active(agent, now)
    }

    /// Withdrawable escrow balance of `agent`.
    pub fn deposits_of(&self, agent: AgentId) -> Amount {
        self.escrow.deposits_of(agent)
    }

    /// Sum of all escrow balances, `None` on overflow.
    pub fn total_deposits(&self) -> Option<Amount> {
        self.escrow.total_held()
    }

    /// Pay out the caller's whole escrow balance through `sink`.
    ///
    /// On failure the balance is unchanged. Returns the amount paid, zero if
    /// there was nothing to withdraw.
    pub fn withdraw(&self, caller: AgentId, sink: &dyn PayoutSink) -> Result<Amount, HrsError> {
        let amount = self
            .escrow
            .withdraw(caller, sink)
            .map_err(|source| HrsError::WithdrawalFailed {
                agent: caller,
                source,
            })?;
        if amount > 0 {
            self.hub.publish(Notification::Withdrawn {
                agent: caller,
                amount,
            });
        }
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Attach a notification listener.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.hub.subscribe()
    }

    /// The notification hub.
    pub const fn notifications(&self) -> &NotificationHub {
        &self.hub
    }
}
