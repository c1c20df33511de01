//! Core of the HRS hierarchical reward system.
//!
//! An [`Organization`] owns a single-rooted tree of agents, each with a
//! numeric level, and two distribution mechanisms that walk the tree upward:
//!
//! - the **reward cascade** ([`cascade`]) credits bonus points to an agent
//!   and a decaying fifth to each ancestor;
//! - the **referral split** ([`splitter`]) divides a subscription price
//!   along the referral chain, 80% per hop, with the root absorbing the
//!   remainder, into a withdrawable escrow.
//!
//! Structural changes ([`promotion`]) and catalog changes ([`catalog`]) are
//! restricted to the principal by the [`AccessGuard`]. Every successful
//! mutation is broadcast as a [`Notification`](hrs_types::Notification)
//! through the [`NotificationHub`].
//!
//! # Usage
//!
//! ```
//! use hrs_core::{Organization, OrganizationSettings};
//! use hrs_types::{AgentId, HierarchySnapshot};
//!
//! let principal = AgentId::new();
//! let root = AgentId::new();
//! let child = AgentId::new();
//! let snapshot = HierarchySnapshot {
//!     superior_to_inferiors: vec![(root, vec![child])],
//!     inferior_to_superior: vec![(child, root)],
//!     levels: vec![(root, 0), (child, 1)],
//! };
//!
//! let mut org = Organization::new(&snapshot, principal, principal, OrganizationSettings::default())
//!     .map_err(|e| e.to_string())?;
//! org.reward(principal, child, 1000).map_err(|e| e.to_string())?;
//! assert_eq!(org.get_points_of(child), 1000);
//! assert_eq!(org.get_points_of(root), 200);
//! # Ok::<(), String>(())
//! ```

pub mod cascade;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod guard;
pub mod notify;
pub mod organization;
pub mod promotion;
pub mod splitter;
pub mod subscriptions;

#[cfg(test)]
mod test_support;

pub use catalog::{PolicyCatalog, PolicyDraft};
pub use config::{ConfigError, HrsConfig};
pub use error::HrsError;
pub use graph::{Chain, HierarchyGraph};
pub use guard::AccessGuard;
pub use notify::NotificationHub;
pub use organization::{
    Organization, OrganizationSettings, SubscriptionReceipt, SubscriptionRequest,
};
pub use promotion::PromotionEngine;
pub use subscriptions::SubscriptionLedger;
