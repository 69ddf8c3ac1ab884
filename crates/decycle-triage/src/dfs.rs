//! Depth-first back-edge removal.
//!
//! A back edge `(u, v)` points from a node to one of its ancestors on the
//! current DFS path. Every cycle contains at least one back edge of any DFS
//! forest, so removing all of them leaves a DAG.
//!
//! The search runs per big SCC (edges outside components cannot be back
//! edges) and is iterative, with an explicit stack of
//! `(node, sorted neighbours, next neighbour)` frames. Start nodes and
//! neighbours are visited in label order so results are deterministic.

use std::collections::HashSet;

use decycle_core::{DecycleError, Edge, Graph};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

use crate::scc::{big_sccs, label};
use crate::strategy::{CycleBreaker, StrategyName};

/// Removes DFS back edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct DfsStrategy;

impl CycleBreaker for DfsStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Dfs
    }

    fn removal_set(&self, graph: &Graph) -> Result<Vec<Edge>, DecycleError> {
        Ok(dfs_back_edges(&graph.graph))
    }
}

/// Back edges of a label-ordered DFS over every big SCC of `graph`.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn dfs_back_edges(graph: &DiGraph<String, ()>) -> Vec<Edge> {
    let mut back_edges: Vec<Edge> = big_sccs(graph)
        .iter()
        .flat_map(|component| {
            let member_set: HashSet<NodeIndex> = component.iter().copied().collect();
            find_back_edges_in_scc(graph, component, &member_set)
        })
        .collect();

    back_edges.sort_unstable();
    back_edges.dedup();
    debug!(removed = back_edges.len(), "dfs back edges");
    back_edges
}

fn sorted_neighbors(
    graph: &DiGraph<String, ()>,
    node: NodeIndex,
    member_set: &HashSet<NodeIndex>,
) -> Vec<NodeIndex> {
    let mut neighbors: Vec<NodeIndex> = graph
        .neighbors_directed(node, Direction::Outgoing)
        .filter(|n| member_set.contains(n))
        .collect();
    neighbors.sort_unstable_by(|a, b| label(graph, *a).cmp(label(graph, *b)));
    neighbors.dedup();
    neighbors
}

/// Run DFS within the nodes of an SCC and collect back edges.
fn find_back_edges_in_scc(
    graph: &DiGraph<String, ()>,
    component: &[NodeIndex],
    member_set: &HashSet<NodeIndex>,
) -> Vec<Edge> {
    let mut starts: Vec<NodeIndex> = component.to_vec();
    starts.sort_unstable_by(|a, b| label(graph, *a).cmp(label(graph, *b)));

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut ancestor_set: HashSet<NodeIndex> = HashSet::new(); // current DFS path
    let mut back_edges: Vec<Edge> = Vec::new();
    let mut call_stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();

    for start in starts {
        if !visited.insert(start) {
            continue;
        }
        ancestor_set.insert(start);
        call_stack.push((start, sorted_neighbors(graph, start, member_set), 0));

        while let Some((current, neighbors, next)) = call_stack.last_mut() {
            let current = *current;
            let Some(&neighbor) = neighbors.get(*next) else {
                call_stack.pop();
                ancestor_set.remove(&current);
                continue;
            };
            *next += 1;

            if ancestor_set.contains(&neighbor) {
                back_edges.push((
                    label(graph, current).to_string(),
                    label(graph, neighbor).to_string(),
                ));
            } else if visited.insert(neighbor) {
                ancestor_set.insert(neighbor);
                call_stack.push((neighbor, sorted_neighbors(graph, neighbor, member_set), 0));
            }
        }
    }

    back_edges
}
