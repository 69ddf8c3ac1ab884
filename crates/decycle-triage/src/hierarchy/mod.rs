//! Hierarchy-driven cycle breaking.
//!
//! # Overview
//!
//! A [`Ranker`] assigns every node a score; an edge `u -> v` is expected to
//! point up the hierarchy (`score(v) >= score(u)`). Within each big SCC the
//! edge that violates the hierarchy the most, i.e. maximises
//! `score(u) - score(v)`, is removed; the component is re-split and the
//! process repeats until no big SCC is left.
//!
//! Scores are computed once on the full graph. Ties go to the last edge in
//! sorted `(source, target)` order.

pub mod agony;
pub mod pagerank;
pub mod trueskill;

use std::collections::HashMap;

use decycle_core::{DecycleError, Edge, Graph};
use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::scc::{big_scc_subgraphs, label};
use crate::strategy::{CycleBreaker, StrategyName};

pub use agony::AgonyRanker;
pub use pagerank::PageRankRanker;
pub use trueskill::TrueSkillRanker;

/// Per-node hierarchy scores, keyed by label.
pub type Scores = HashMap<String, f64>;

/// Source of node scores for hierarchy removal.
pub trait Ranker {
    /// Strategy name the ranker is dispatched under.
    fn name(&self) -> StrategyName;

    /// Score every node of `graph`. Higher means further up the hierarchy.
    fn scores(&self, graph: &DiGraph<String, ()>) -> Scores;
}

/// Greedy hierarchy removal driven by a [`Ranker`].
#[derive(Debug, Clone)]
pub struct HierarchyStrategy<R> {
    ranker: R,
}

impl<R: Ranker> HierarchyStrategy<R> {
    pub const fn new(ranker: R) -> Self {
        Self { ranker }
    }
}

impl<R: Ranker> CycleBreaker for HierarchyStrategy<R> {
    fn name(&self) -> StrategyName {
        self.ranker.name()
    }

    fn removal_set(&self, graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
        let scores = self.ranker.scores(&graph.graph);
        Ok(greedy_hierarchy_removal(&graph.graph, &scores))
    }
}

/// Remove hierarchy-violating edges until every big SCC is broken.
///
/// Nodes missing from `scores` count as 0.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn greedy_hierarchy_removal(graph: &DiGraph<String, ()>, scores: &Scores) -> Vec<Edge> {
    let score = |node: &str| scores.get(node).copied().unwrap_or(0.0);
    let mut removed = Vec::new();
    let mut pending = big_scc_subgraphs(graph);

    while let Some(mut component) = pending.pop() {
        let Some((edge, id)) = worst_edge(&component, score) else {
            continue;
        };
        component.remove_edge(id);
        removed.push(edge);
        pending.extend(big_scc_subgraphs(&component));
    }

    removed.sort_unstable();
    removed.dedup();
    debug!(removed = removed.len(), "hierarchy removal");
    removed
}

/// Edge with the largest `score(source) - score(target)`.
fn worst_edge(
    component: &DiGraph<String, ()>,
    score: impl Fn(&str) -> f64,
) -> Option<(Edge, EdgeIndex)> {
    let mut edges: Vec<(Edge, EdgeIndex)> = component
        .edge_references()
        .map(|e| {
            let edge = (
                label(component, e.source()).to_string(),
                label(component, e.target()).to_string(),
            );
            (edge, e.id())
        })
        .collect();
    edges.sort_unstable();

    let mut best: Option<(f64, (Edge, EdgeIndex))> = None;
    for candidate in edges {
        let violation = score(&candidate.0.0) - score(&candidate.0.1);
        if best
            .as_ref()
            .is_none_or(|(top, _)| violation.total_cmp(top).is_ge())
        {
            best = Some((violation, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}
