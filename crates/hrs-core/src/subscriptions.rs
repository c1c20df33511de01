//! Subscriber to active-subscription records.
//!
//! A subscriber holds at most one subscription. Buying again replaces the
//! previous record, whichever policy it was for.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use hrs_types::{AgentId, Policy, Subscription};

use crate::error::HrsError;

/// Current subscription of every subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionLedger {
    by_subscriber: BTreeMap<AgentId, Subscription>,
}

impl SubscriptionLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            by_subscriber: BTreeMap::new(),
        }
    }

    /// The subscription of `subscriber`, if any (expired or not).
    pub fn subscription_of(&self, subscriber: AgentId) -> Option<&Subscription> {
        self.by_subscriber.get(&subscriber)
    }

    /// Whether `subscriber` holds a subscription that has not expired at `now`.
    pub fn is_active(&self, subscriber: AgentId, now: DateTime<Utc>) -> bool {
        self.subscription_of(subscriber)
            .is_some_and(|s| s.is_active_at(now))
    }

    /// Number of subscribers on record.
    pub fn len(&self) -> usize {
        self.by_subscriber.len()
    }

    /// Whether nobody has subscribed yet.
    pub fn is_empty(&self) -> bool {
        self.by_subscriber.is_empty()
    }

    /// Build the record for `subscriber` buying `policy` at `now`.
    ///
    /// Does not store it; see [`SubscriptionLedger::record`].
    pub fn draft(
        subscriber: AgentId,
        policy: &Policy,
        referred_agent: AgentId,
        now: DateTime<Utc>,
    ) -> Result<Subscription, HrsError> {
        let term = i64::try_from(policy.term_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| HrsError::overflow(format!("term of {} is too long", policy.id)))?;
        let expires_at = now
            .checked_add_signed(term)
            .ok_or_else(|| HrsError::overflow(format!("expiry of {} overflows", policy.id)))?;

        Ok(Subscription {
            subscriber,
            policy_id: policy.id,
            referred_agent,
            started_at: now,
            expires_at,
        })
    }

    /// Store `subscription`, replacing any previous one of the same subscriber.
    pub fn record(&mut self, subscription: Subscription) -> Option<Subscription> {
        self.by_subscriber
            .insert(subscription.subscriber, subscription)
    }
}
