//! Greedy minimum feedback arc set (Eades, Lin & Smyth 1993).
//!
//! # Algorithm
//!
//! Within each big SCC, build a linear order of the nodes:
//!
//! 1. While a sink exists, move it to the front of the tail sequence `s2`.
//! 2. While a source exists, append it to the head sequence `s1`.
//! 3. Otherwise append the node maximising `out_degree - in_degree` to `s1`.
//!
//! Degrees count only edges between remaining nodes, self-loops excluded.
//! The order is `s1 ++ s2`; every edge pointing backwards in it (and every
//! self-loop) is removed. The result is an approximation, not a minimum.

use std::collections::HashMap;

use decycle_core::{DecycleError, Edge, Graph};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::scc::{big_sccs, induced_subgraph, label};
use crate::strategy::{CycleBreaker, StrategyName};

/// Greedy feedback arc set strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MfasStrategy;

impl CycleBreaker for MfasStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Mfas
    }

    fn removal_set(&self, graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
        Ok(greedy_feedback_arcs(&graph.graph))
    }
}

/// Edges that point backwards in the greedy order of each big SCC.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn greedy_feedback_arcs(graph: &DiGraph<String, ()>) -> Vec<Edge> {
    let mut removed = Vec::new();

    for component in big_sccs(graph) {
        let sub = induced_subgraph(graph, &component);
        let order = greedy_order(&sub);
        let position: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(pos, &node)| (node, pos)).collect();

        for edge in sub.edge_references() {
            let (s, t) = (edge.source(), edge.target());
            if position[&s] >= position[&t] {
                removed.push((label(&sub, s).to_string(), label(&sub, t).to_string()));
            }
        }
    }

    removed.sort_unstable();
    removed.dedup();
    debug!(removed = removed.len(), "greedy feedback arc set");
    removed
}

/// Eades–Lin–Smyth vertex sequence. Ties are broken by label.
fn greedy_order(graph: &DiGraph<String, ()>) -> Vec<NodeIndex> {
    let mut remaining: Vec<NodeIndex> = graph.node_indices().collect();
    remaining.sort_unstable_by(|a, b| label(graph, *a).cmp(label(graph, *b)));

    let degree = |node: NodeIndex, dir: Direction| -> usize {
        graph
            .neighbors_directed(node, dir)
            .filter(|&n| n != node)
            .count()
    };
    let mut out_deg: HashMap<NodeIndex, usize> = remaining
        .iter()
        .map(|&n| (n, degree(n, Direction::Outgoing)))
        .collect();
    let mut in_deg: HashMap<NodeIndex, usize> = remaining
        .iter()
        .map(|&n| (n, degree(n, Direction::Incoming)))
        .collect();

    let mut head: Vec<NodeIndex> = Vec::with_capacity(remaining.len());
    let mut tail: Vec<NodeIndex> = Vec::new(); // reversed s2

    while !remaining.is_empty() {
        let pick = if let Some(pos) = remaining.iter().position(|n| out_deg[n] == 0) {
            tail.push(remaining[pos]);
            pos
        } else if let Some(pos) = remaining.iter().position(|n| in_deg[n] == 0) {
            head.push(remaining[pos]);
            pos
        } else {
            let pos = best_delta(&remaining, &out_deg, &in_deg);
            head.push(remaining[pos]);
            pos
        };

        let node = remaining.remove(pick);
        for succ in graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(d) = in_deg.get_mut(&succ).filter(|_| succ != node) {
                *d = d.saturating_sub(1);
            }
        }
        for pred in graph.neighbors_directed(node, Direction::Incoming) {
            if let Some(d) = out_deg.get_mut(&pred).filter(|_| pred != node) {
                *d = d.saturating_sub(1);
            }
        }
        out_deg.remove(&node);
        in_deg.remove(&node);
    }

    tail.reverse();
    head.extend(tail);
    head
}

/// Position in `remaining` of the first node with maximal `out - in`.
fn best_delta(
    remaining: &[NodeIndex],
    out_deg: &HashMap<NodeIndex, usize>,
    in_deg: &HashMap<NodeIndex, usize>,
) -> usize {
    // out(a) - in(a) > out(b) - in(b), kept in unsigned arithmetic.
    let beats = |a: &NodeIndex, b: &NodeIndex| out_deg[a] + in_deg[b] > out_deg[b] + in_deg[a];
    let mut best = 0;
    for (pos, node) in remaining.iter().enumerate().skip(1) {
        if beats(node, &remaining[best]) {
            best = pos;
        }
    }
    best
}
