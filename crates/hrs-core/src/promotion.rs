//! Principal-only structural mutations of the hierarchy.
//!
//! Each operation checks the caller first, then validates against the graph,
//! and only then mutates. A rejected call leaves the graph untouched and
//! returns no notification.

use tracing::info;

use hrs_types::{AgentId, Level, Notification};

use crate::error::HrsError;
use crate::graph::HierarchyGraph;
use crate::guard::AccessGuard;

/// Mutates a [`HierarchyGraph`] on behalf of the principal.
#[derive(Debug)]
pub struct PromotionEngine<'a> {
    graph: &'a mut HierarchyGraph,
    guard: &'a AccessGuard,
}

impl<'a> PromotionEngine<'a> {
    /// Borrow the graph for mutation under `guard`.
    pub const fn new(graph: &'a mut HierarchyGraph, guard: &'a AccessGuard) -> Self {
        Self { graph, guard }
    }

    /// Move `agent` under `new_superior` and set its level.
    pub fn promote(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_level: Level,
        new_superior: AgentId,
    ) -> Result<Notification, HrsError> {
        self.guard.require_principal(caller, "promote")?;
        // relink validates everything set_level could fail on.
        let old_superior = self.graph.relink(agent, new_superior)?;
        let old_level = self.graph.set_level(agent, new_level)?;

        info!(
            %agent,
            old_superior = ?old_superior,
            %new_superior,
            old_level,
            new_level,
            "Agent promoted"
        );
        Ok(Notification::Promoted {
            agent,
            new_level,
            new_superior,
        })
    }

    /// Move `agent` under `new_superior` without touching its level.
    pub fn change_superior(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_superior: AgentId,
    ) -> Result<Notification, HrsError> {
        self.guard.require_principal(caller, "change_superior")?;
        let old_superior = self.graph.relink(agent, new_superior)?;

        info!(%agent, old_superior = ?old_superior, %new_superior, "Superior changed");
        Ok(Notification::SuperiorChanged {
            agent,
            old_superior,
            new_superior,
        })
    }

    /// Set the level of `agent` without touching its relationships.
    pub fn change_level(
        &mut self,
        caller: AgentId,
        agent: AgentId,
        new_level: Level,
    ) -> Result<Notification, HrsError> {
        self.guard.require_principal(caller, "change_level")?;
        let old_level = self.graph.set_level(agent, new_level)?;

        info!(%agent, old_level, new_level, "Level changed");
        Ok(Notification::LevelChanged {
            agent,
            old_level,
            new_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Tree;

    #[test]
    fn promote_relinks_and_relevels() {
        let t = Tree::new();
        let mut graph = t.graph();
        let guard = AccessGuard::new(t.principal);

        let notification = PromotionEngine::new(&mut graph, &guard).promote(t.principal, t.d, 1, t.a);

        assert_eq!(
            notification.ok(),
            Some(Notification::Promoted {
                agent: t.d,
                new_level: 1,
                new_superior: t.a,
            }),
        );
        assert_eq!(graph.superior_of(t.d).ok(), Some(Some(t.a)));
        assert_eq!(graph.level_of(t.d).ok(), Some(1));
        assert!(graph.inferiors_of(t.b).is_ok_and(|i| !i.contains(&t.d)));
        assert!(graph.inferiors_of(t.a).is_ok_and(|i| i.contains(&t.d)));
    }

    #[test]
    fn non_principal_changes_nothing() {
        let t = Tree::new();
        let mut graph = t.graph();
        let before = graph.clone();
        let guard = AccessGuard::new(t.principal);
        let mut engine = PromotionEngine::new(&mut graph, &guard);

        assert!(matches!(engine.promote(t.d, t.d, 1, t.a), Err(HrsError::Unauthorized { .. })));
        assert!(matches!(engine.change_superior(t.a, t.d, t.c), Err(HrsError::Unauthorized { .. })));
        assert!(matches!(engine.change_level(t.b, t.b, 9), Err(HrsError::Unauthorized { .. })));
        assert_eq!(graph, before);
    }

    #[test]
    fn promote_into_own_subtree_is_rejected_atomically() {
        let t = Tree::new();
        let mut graph = t.graph();
        let before = graph.clone();
        let guard = AccessGuard::new(t.principal);

        let result = PromotionEngine::new(&mut graph, &guard).promote(t.principal, t.b, 5, t.g);

        assert!(matches!(result, Err(HrsError::Cycle { agent, new_superior }) if agent == t.b && new_superior == t.g));
        // Level must not change either.
        assert_eq!(graph, before);
    }

    #[test]
    fn change_superior_keeps_level() {
        let t = Tree::new();
        let mut graph = t.graph();
        let guard = AccessGuard::new(t.principal);

        let notification =
            PromotionEngine::new(&mut graph, &guard).change_superior(t.principal, t.g, t.c);

        assert_eq!(
            notification.ok(),
            Some(Notification::SuperiorChanged {
                agent: t.g,
                old_superior: Some(t.d),
                new_superior: t.c,
            }),
        );
        assert_eq!(graph.level_of(t.g).ok(), Some(3));
        assert_eq!(graph.superior_of(t.g).ok(), Some(Some(t.c)));
    }

    #[test]
    fn change_level_keeps_links() {
        let t = Tree::new();
        let mut graph = t.graph();
        let guard = AccessGuard::new(t.principal);

        let result = PromotionEngine::new(&mut graph, &guard).change_level(t.principal, t.e, 0);

        assert!(result.is_ok());
        assert_eq!(graph.level_of(t.e).ok(), Some(0));
        assert_eq!(graph.superior_of(t.e).ok(), Some(Some(t.b)));
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let t = Tree::new();
        let mut graph = t.graph();
        let guard = AccessGuard::new(t.principal);
        let mut engine = PromotionEngine::new(&mut graph, &guard);
        let stranger = AgentId::new();

        assert!(matches!(engine.promote(t.principal, t.d, 1, stranger), Err(HrsError::UnknownAgent(a)) if a == stranger));
        assert!(matches!(engine.change_level(t.principal, stranger, 1), Err(HrsError::UnknownAgent(_))));
    }
}
