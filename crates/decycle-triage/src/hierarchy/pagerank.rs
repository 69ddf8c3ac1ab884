//! PageRank node scores.
//!
//! # Algorithm
//!
//! Power iteration on the full dependency graph:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! where `d` is the damping factor (default 0.85). Rank of dangling nodes
//! (no outgoing edges) is spread evenly over all nodes. Rank flows along
//! dependency edges, so heavily depended-upon nodes score high.

use std::collections::HashMap;

use decycle_core::config::PageRankConfig;
use petgraph::Direction;
use petgraph::graph::DiGraph;
use tracing::{instrument, warn};

use super::{Ranker, Scores};
use crate::strategy::StrategyName;

/// Result of a PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// PageRank scores: node label → score.
    pub scores: Scores,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// [`Ranker`] backed by [`pagerank`].
#[derive(Debug, Clone, Default)]
pub struct PageRankRanker {
    config: PageRankConfig,
}

impl PageRankRanker {
    #[must_use]
    pub const fn new(config: PageRankConfig) -> Self {
        Self { config }
    }
}

impl Ranker for PageRankRanker {
    fn name(&self) -> StrategyName {
        StrategyName::PageRank
    }

    fn scores(&self, graph: &DiGraph<String, ()>) -> Scores {
        pagerank(graph, &self.config).scores
    }
}

/// Compute PageRank from scratch.
#[must_use]
#[instrument(skip(graph, config), fields(nodes = graph.node_count()))]
pub fn pagerank(graph: &DiGraph<String, ()>, config: &PageRankConfig) -> PageRankResult {
    let n = graph.node_count();

    if n == 0 {
        return PageRankResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        };
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.max_iter {
        iterations += 1;

        new_ranks.fill(base);

        for node in graph.node_indices() {
            let idx = node.index();
            let out_degree = graph.neighbors_directed(node, Direction::Outgoing).count();

            if out_degree == 0 {
                let share = config.damping * ranks[idx] / n_f64;
                for r in &mut new_ranks {
                    *r += share;
                }
            } else {
                let share = config.damping * ranks[idx] / out_degree as f64;
                for neighbor in graph.neighbors_directed(node, Direction::Outgoing) {
                    new_ranks[neighbor.index()] += share;
                }
            }
        }

        // L1 norm of the delta.
        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, "pagerank did not converge");
    }

    let scores = graph
        .node_indices()
        .map(|node| (graph[node].clone(), ranks[node.index()]))
        .collect();

    PageRankResult {
        scores,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decycle_core::Graph;

    #[test]
    fn empty_graph_converges_immediately() {
        let result = pagerank(&DiGraph::new(), &PageRankConfig::default());
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn scores_sum_to_one() {
        let g = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        let result = pagerank(&g.graph, &PageRankConfig::default());
        let total: f64 = result.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6, "total = {total}");
    }

    #[test]
    fn depended_upon_node_ranks_highest() {
        let g = Graph::from_edges([("a", "core"), ("b", "core"), ("c", "core")]);
        let result = pagerank(&g.graph, &PageRankConfig::default());
        assert!(result.converged);
        assert!(result.scores["core"] > result.scores["a"]);
        assert!((result.scores["a"] - result.scores["b"]).abs() < 1e-9);
    }

    #[test]
    fn symmetric_cycle_has_uniform_scores() {
        let g = Graph::from_edges([("x", "y"), ("y", "z"), ("z", "x")]);
        let result = pagerank(&g.graph, &PageRankConfig::default());
        for score in result.scores.values() {
            assert!((score - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn iteration_cap_is_respected() {
        let g = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("a", "c")]);
        let config = PageRankConfig {
            max_iter: 2,
            tolerance: 0.0,
            ..PageRankConfig::default()
        };
        let result = pagerank(&g.graph, &config);
        assert_eq!(result.iterations, 2);
        assert!(!result.converged);
    }
}
