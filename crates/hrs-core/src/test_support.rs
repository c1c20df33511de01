//! Shared fixture for unit tests.
//!
//! ```text
//!         A (0)
//!        /     \
//!     B (1)    C (1)
//!    /     \
//!  D (2)   E (2)
//!  /   \
//! F (3) G (3)
//! ```

#![allow(clippy::expect_used)]

use hrs_types::{AgentId, HierarchySnapshot};

use crate::graph::HierarchyGraph;

/// Seven-agent reference tree plus the deployment identities.
pub struct Tree {
    pub owner: AgentId,
    pub principal: AgentId,
    pub a: AgentId,
    pub b: AgentId,
    pub c: AgentId,
    pub d: AgentId,
    pub e: AgentId,
    pub f: AgentId,
    pub g: AgentId,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            owner: AgentId::new(),
            principal: AgentId::new(),
            a: AgentId::new(),
            b: AgentId::new(),
            c: AgentId::new(),
            d: AgentId::new(),
            e: AgentId::new(),
            f: AgentId::new(),
            g: AgentId::new(),
        }
    }

    pub fn snapshot(&self) -> HierarchySnapshot {
        HierarchySnapshot {
            superior_to_inferiors: vec![
                (self.a, vec![self.b, self.c]),
                (self.b, vec![self.d, self.e]),
                (self.d, vec![self.f, self.g]),
            ],
            inferior_to_superior: vec![
                (self.b, self.a),
                (self.c, self.a),
                (self.d, self.b),
                (self.e, self.b),
                (self.f, self.d),
                (self.g, self.d),
            ],
            levels: vec![
                (self.a, 0),
                (self.b, 1),
                (self.c, 1),
                (self.d, 2),
                (self.e, 2),
                (self.f, 3),
                (self.g, 3),
            ],
        }
    }

    pub fn graph(&self) -> HierarchyGraph {
        HierarchyGraph::from_snapshot(&self.snapshot()).expect("reference tree is consistent")
    }
}
