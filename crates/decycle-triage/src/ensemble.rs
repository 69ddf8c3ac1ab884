//! Voting across the hierarchy strategies.
//!
//! Each member strategy proposes a removal set; every proposed edge gets one
//! vote per member. Edges are then removed in descending vote order (ties in
//! edge order), skipping any edge that no longer lies on a cycle, until the
//! graph is acyclic. Since each member's proposal alone breaks every cycle,
//! the union does too.

use std::collections::BTreeMap;

use decycle_core::config::DecycleConfig;
use decycle_core::{DecycleError, Edge, Graph};
use tracing::{debug, instrument};

use crate::hierarchy::{AgonyRanker, HierarchyStrategy, PageRankRanker, TrueSkillRanker};
use crate::scc::on_cycle;
use crate::strategy::{CycleBreaker, StrategyName};

/// Majority vote over member strategies.
pub struct EnsembleStrategy {
    members: Vec<Box<dyn CycleBreaker>>,
}

impl EnsembleStrategy {
    #[must_use]
    pub fn new(members: Vec<Box<dyn CycleBreaker>>) -> Self {
        Self { members }
    }

    /// PageRank, TrueSkill and social-agony members configured from `config`.
    #[must_use]
    pub fn with_config(config: &DecycleConfig) -> Self {
        Self::new(vec![
            Box::new(HierarchyStrategy::new(PageRankRanker::new(config.pagerank.clone()))),
            Box::new(HierarchyStrategy::new(TrueSkillRanker::new(config.trueskill.clone()))),
            Box::new(HierarchyStrategy::new(AgonyRanker::new(config.agony.clone()))),
        ])
    }
}

impl std::fmt::Debug for EnsembleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<StrategyName> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("EnsembleStrategy").field("members", &names).finish()
    }
}

impl CycleBreaker for EnsembleStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Ensembling
    }

    #[instrument(skip_all, fields(members = self.members.len()))]
    fn removal_set(&self, graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
        let mut votes: BTreeMap<Edge, usize> = BTreeMap::new();
        for member in &self.members {
            for edge in member.removal_set(graph)? {
                *votes.entry(edge).or_insert(0) += 1;
            }
        }

        // Stable sort keeps edge order among equal vote counts.
        let mut ballot: Vec<(Edge, usize)> = votes.into_iter().collect();
        ballot.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining = graph.graph.clone();
        let mut removed = Vec::new();
        for (edge, count) in ballot {
            if !petgraph::algo::is_cyclic_directed(&remaining) {
                break;
            }
            let (Some(s), Some(t)) = (graph.node_index(&edge.0), graph.node_index(&edge.1)) else {
                continue;
            };
            if !on_cycle(&remaining, s, t) {
                continue;
            }
            if let Some(id) = remaining.find_edge(s, t) {
                remaining.remove_edge(id);
                debug!(source = %edge.0, target = %edge.1, votes = count, "ensemble removal");
                removed.push(edge);
            }
        }

        removed.sort_unstable();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Edge>);

    impl CycleBreaker for Fixed {
        fn name(&self) -> StrategyName {
            StrategyName::Dfs
        }

        fn removal_set(&self, _graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
            Ok(self.0.clone())
        }
    }

    fn edge(a: &str, b: &str) -> Edge {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn majority_edge_wins() {
        let g = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "a")]);
        let ensemble = EnsembleStrategy::new(vec![
            Box::new(Fixed(vec![edge("c", "a")])),
            Box::new(Fixed(vec![edge("c", "a")])),
            Box::new(Fixed(vec![edge("a", "b")])),
        ]);

        assert_eq!(ensemble.removal_set(&g).expect("ensemble"), vec![edge("c", "a")]);
    }

    #[test]
    fn vote_ties_fall_back_to_edge_order() {
        let g = Graph::from_edges([("a", "b"), ("b", "a")]);
        let ensemble = EnsembleStrategy::new(vec![
            Box::new(Fixed(vec![edge("b", "a")])),
            Box::new(Fixed(vec![edge("a", "b")])),
        ]);

        assert_eq!(ensemble.removal_set(&g).expect("ensemble"), vec![edge("a", "b")]);
    }

    #[test]
    fn stops_once_acyclic() {
        let g = Graph::from_edges([("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        let ensemble = EnsembleStrategy::new(vec![
            Box::new(Fixed(vec![edge("a", "b"), edge("c", "d")])),
            Box::new(Fixed(vec![edge("b", "a"), edge("d", "c")])),
        ]);

        let removed = ensemble.removal_set(&g).expect("ensemble");

        assert_eq!(removed, vec![edge("a", "b"), edge("c", "d")]);
        assert!(!g.without_edges(&removed).is_cyclic());
    }

    #[test]
    fn member_errors_propagate() {
        struct Failing;
        impl CycleBreaker for Failing {
            fn name(&self) -> StrategyName {
                StrategyName::PageRank
            }
            fn removal_set(&self, _graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
                Err(DecycleError::ExternalTool {
                    tool: "ranker".to_string(),
                    reason: "boom".to_string(),
                })
            }
        }

        let g = Graph::from_edges([("a", "b"), ("b", "a")]);
        let ensemble = EnsembleStrategy::new(vec![Box::new(Failing)]);
        assert!(matches!(
            ensemble.removal_set(&g),
            Err(DecycleError::ExternalTool { .. })
        ));
    }

    #[test]
    fn configured_members_break_cycles() {
        let g = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "c")]);
        let ensemble = EnsembleStrategy::with_config(&DecycleConfig::default());
        let removed = ensemble.removal_set(&g).expect("ensemble");
        assert!(!g.without_edges(&removed).is_cyclic());
    }
}
