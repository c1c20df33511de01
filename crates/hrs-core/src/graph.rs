//! The hierarchy arena.
//!
//! Agent records live in a single map keyed by [`AgentId`]. Each record holds
//! an optional superior id and the set of its inferiors' ids; there are no
//! object cross-references, so relinking is a matter of removing an id from
//! one set and inserting it into another within a single `&mut` call.
//!
//! # Invariants
//!
//! Established by [`HierarchyGraph::from_snapshot`] and preserved by
//! [`HierarchyGraph::relink`]:
//!
//! 1. Exactly one agent, the root, has no superior.
//! 2. `a` is in `inferiors(s)` if and only if `superior(a) == s`.
//! 3. Following superiors from any agent reaches the root in fewer than
//!    `len()` steps (no cycles).

use std::collections::{BTreeMap, BTreeSet};

use hrs_types::{AgentId, HierarchyNode, HierarchySnapshot, Level};

use crate::error::HrsError;

// ---------------------------------------------------------------------------
// HierarchyGraph
// ---------------------------------------------------------------------------

/// A validated tree of agents with levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyGraph {
    nodes: BTreeMap<AgentId, HierarchyNode>,
    root: AgentId,
}

impl HierarchyGraph {
    /// Build the graph from a deployment snapshot.
    ///
    /// Every agent mentioned anywhere in the snapshot must have exactly one
    /// level entry. The inferior-to-superior view and the
    /// superior-to-inferiors view must contain exactly the same edges, the
    /// edges must form a single tree, and that tree must have one root.
    pub fn from_snapshot(snapshot: &HierarchySnapshot) -> Result<Self, HrsError> {
        let mut nodes: BTreeMap<AgentId, HierarchyNode> = BTreeMap::new();

        for &(agent, level) in &snapshot.levels {
            if nodes.insert(agent, HierarchyNode::detached(level)).is_some() {
                return Err(HrsError::inconsistent(format!(
                    "agent {agent} has more than one level entry"
                )));
            }
        }

        // Inferior -> superior view sets the authoritative superior links.
        for &(inferior, superior) in &snapshot.inferior_to_superior {
            if inferior == superior {
                return Err(HrsError::inconsistent(format!(
                    "agent {inferior} is listed as its own superior"
                )));
            }
            if !nodes.contains_key(&superior) {
                return Err(missing_level(superior));
            }
            let node = nodes.get_mut(&inferior).ok_or_else(|| missing_level(inferior))?;
            if let Some(previous) = node.superior.replace(superior) {
                return Err(HrsError::inconsistent(format!(
                    "agent {inferior} is listed under both {previous} and {superior}"
                )));
            }
        }

        // Superior -> inferiors view must agree edge for edge.
        let mut listed: BTreeSet<AgentId> = BTreeSet::new();
        for (superior, inferiors) in &snapshot.superior_to_inferiors {
            if !nodes.contains_key(superior) {
                return Err(missing_level(*superior));
            }
            for inferior in inferiors {
                if !listed.insert(*inferior) {
                    return Err(HrsError::inconsistent(format!(
                        "agent {inferior} appears more than once as an inferior"
                    )));
                }
                match nodes.get(inferior).map(|n| n.superior) {
                    None => return Err(missing_level(*inferior)),
                    Some(Some(s)) if s == *superior => {}
                    Some(_) => {
                        return Err(HrsError::inconsistent(format!(
                            "views disagree: {inferior} is an inferior of {superior} \
                             but its superior link says otherwise"
                        )));
                    }
                }
            }
        }
        if let Some((agent, _)) = nodes
            .iter()
            .find(|(agent, node)| node.superior.is_some() && !listed.contains(*agent))
        {
            return Err(HrsError::inconsistent(format!(
                "views disagree: {agent} has a superior but is missing from its inferior list"
            )));
        }

        let edges: Vec<(AgentId, AgentId)> = nodes
            .iter()
            .filter_map(|(agent, node)| node.superior.map(|s| (s, *agent)))
            .collect();
        for (superior, inferior) in edges {
            if let Some(node) = nodes.get_mut(&superior) {
                node.inferiors.insert(inferior);
            }
        }

        let mut roots = nodes
            .iter()
            .filter(|(_, node)| node.superior.is_none())
            .map(|(agent, _)| *agent);
        let root = roots
            .next()
            .ok_or_else(|| HrsError::inconsistent("hierarchy has no root"))?;
        if let Some(second) = roots.next() {
            return Err(HrsError::inconsistent(format!(
                "hierarchy has more than one root ({root} and {second})"
            )));
        }

        let graph = Self { nodes, root };
        if let Some(agent) = graph.nodes.keys().find(|a| graph.depth_of(**a).is_none()) {
            return Err(HrsError::inconsistent(format!(
                "agent {agent} does not reach the root (cycle)"
            )));
        }
        Ok(graph)
    }

    /// Export the current state in snapshot form.
    ///
    /// Feeding the result back into [`HierarchyGraph::from_snapshot`]
    /// reproduces an equal graph.
    pub fn to_snapshot(&self) -> HierarchySnapshot {
        HierarchySnapshot {
            superior_to_inferiors: self
                .nodes
                .iter()
                .filter(|(_, node)| !node.inferiors.is_empty())
                .map(|(agent, node)| (*agent, node.inferiors.iter().copied().collect()))
                .collect(),
            inferior_to_superior: self
                .nodes
                .iter()
                .filter_map(|(agent, node)| node.superior.map(|s| (*agent, s)))
                .collect(),
            levels: self
                .nodes
                .iter()
                .map(|(agent, node)| (*agent, node.level))
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The unique agent with no superior.
    pub const fn root(&self) -> AgentId {
        self.root
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a valid graph holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `agent` is registered.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.nodes.contains_key(&agent)
    }

    /// All registered agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.nodes.keys().copied()
    }

    /// The full record of `agent`.
    pub fn node(&self, agent: AgentId) -> Result<&HierarchyNode, HrsError> {
        self.nodes.get(&agent).ok_or(HrsError::UnknownAgent(agent))
    }

    /// Direct superior of `agent`, `None` for the root.
    pub fn superior_of(&self, agent: AgentId) -> Result<Option<AgentId>, HrsError> {
        self.node(agent).map(|n| n.superior)
    }

    /// Direct inferiors of `agent`.
    pub fn inferiors_of(&self, agent: AgentId) -> Result<&BTreeSet<AgentId>, HrsError> {
        self.node(agent).map(|n| &n.inferiors)
    }

    /// Level of `agent`.
    pub fn level_of(&self, agent: AgentId) -> Result<Level, HrsError> {
        self.node(agent).map(|n| n.level)
    }

    /// `agent` followed by each of its ancestors up to and including the root.
    pub fn chain(&self, agent: AgentId) -> Result<Chain<'_>, HrsError> {
        self.node(agent)?;
        Ok(Chain {
            graph: self,
            next: Some(agent),
            remaining: self.nodes.len(),
        })
    }

    /// The ancestors of `agent`, nearest first, ending at the root.
    pub fn ancestors(&self, agent: AgentId) -> Result<Chain<'_>, HrsError> {
        let mut chain = self.chain(agent)?;
        chain.next();
        Ok(chain)
    }

    /// Whether `candidate` lies strictly below `of`.
    pub fn is_descendant(&self, candidate: AgentId, of: AgentId) -> Result<bool, HrsError> {
        self.node(of)?;
        Ok(self.ancestors(candidate)?.any(|a| a == of))
    }

    /// Number of hops from `agent` to the root, `None` if the walk does not
    /// terminate within `len()` hops or `agent` is unknown.
    pub fn depth_of(&self, agent: AgentId) -> Option<usize> {
        let mut current = self.nodes.get(&agent)?;
        let mut depth: usize = 0;
        while let Some(superior) = current.superior {
            depth = depth.checked_add(1)?;
            if depth >= self.nodes.len() {
                return None;
            }
            current = self.nodes.get(&superior)?;
        }
        Some(depth)
    }

    // -----------------------------------------------------------------------
    // Mutations (promotion engine only)
    // -----------------------------------------------------------------------

    /// Move `agent` under `new_superior`. Returns the previous superior.
    ///
    /// Fails with [`HrsError::Cycle`] when `new_superior` is `agent` or one of
    /// its descendants; this also makes the root immovable. Nothing is
    /// modified on failure.
    pub(crate) fn relink(
        &mut self,
        agent: AgentId,
        new_superior: AgentId,
    ) -> Result<Option<AgentId>, HrsError> {
        self.node(agent)?;
        self.node(new_superior)?;
        if new_superior == agent || self.is_descendant(new_superior, agent)? {
            return Err(HrsError::Cycle {
                agent,
                new_superior,
            });
        }

        let node = self
            .nodes
            .get_mut(&agent)
            .ok_or(HrsError::UnknownAgent(agent))?;
        let old_superior = node.superior.replace(new_superior);

        if let Some(old) = old_superior.and_then(|s| self.nodes.get_mut(&s)) {
            old.inferiors.remove(&agent);
        }
        if let Some(new) = self.nodes.get_mut(&new_superior) {
            new.inferiors.insert(agent);
        }
        Ok(old_superior)
    }

    /// Set the level of `agent`. Returns the previous level.
    pub(crate) fn set_level(&mut self, agent: AgentId, level: Level) -> Result<Level, HrsError> {
        let node = self
            .nodes
            .get_mut(&agent)
            .ok_or(HrsError::UnknownAgent(agent))?;
        Ok(core::mem::replace(&mut node.level, level))
    }
}

/// Build the error for an agent referenced without a level entry.
fn missing_level(agent: AgentId) -> HrsError {
    HrsError::inconsistent(format!("agent {agent} has no level entry"))
}

// ---------------------------------------------------------------------------
// Chain iterator
// ---------------------------------------------------------------------------

/// Walks superior links upward. Never yields more than `len()` agents.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    graph: &'a HierarchyGraph,
    next: Option<AgentId>,
    remaining: usize,
}

impl Iterator for Chain<'_> {
    type Item = AgentId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.remaining = self.remaining.checked_sub(1)?;
        self.next = self
            .graph
            .nodes
            .get(&current)
            .and_then(|node| node.superior);
        Some(current)
    }
}
