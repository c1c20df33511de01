//! Shared type definitions for the HRS hierarchical reward system.
//!
//! This crate is the single source of truth for the data exchanged between
//! the ledger, the core engine, and external listeners. Types are exported
//! to `TypeScript` via `ts-rs` so notification listeners can consume them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers ([`AgentId`], [`PolicyId`])
//! - [`structs`] -- Hierarchy records, snapshots, credits, policies, subscriptions
//! - [`notification`] -- Notifications emitted after successful mutations

pub mod ids;
pub mod notification;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{AgentId, PolicyId};
pub use notification::Notification;
pub use structs::{
    Amount, Credit, HierarchyNode, HierarchySnapshot, Level, Policy, Subscription,
};
