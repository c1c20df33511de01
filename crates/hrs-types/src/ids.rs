//! Type-safe identifier wrappers.
//!
//! Agents are identified by UUID v7 newtypes so that a caller identity can
//! never be confused with any other UUID flowing through the system.
//! Policies are numbered sequentially by the catalog, so [`PolicyId`] wraps
//! a plain counter instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent (a participant in the hierarchy).
    ///
    /// The same type identifies callers: the principal, the owner, payers
    /// and withdrawers are all agents in this sense, whether or not they
    /// hold a node in the hierarchy.
    AgentId
}

/// Sequential identifier of a policy in the catalog.
///
/// The first registered policy receives id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PolicyId(pub u64);

impl PolicyId {
    /// Return the raw sequence number.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` if the sequence is exhausted.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl core::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "policy#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
    }

    #[test]
    fn agent_id_serializes_as_bare_uuid() {
        let id = AgentId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.into_inner())));
    }

    #[test]
    fn agent_id_display_matches_uuid() {
        let id = AgentId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn policy_id_sequence() {
        assert_eq!(PolicyId(0).next(), Some(PolicyId(1)));
        assert_eq!(PolicyId(u64::MAX).next(), None);
        assert_eq!(PolicyId(7).to_string(), "policy#7");
    }
}
