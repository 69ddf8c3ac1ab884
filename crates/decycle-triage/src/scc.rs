//! Strongly connected component helpers shared by the strategies.
//!
//! Only "big" components matter for cycle breaking: more than one node, or a
//! single node with a self-loop. Everything outside them is already acyclic.

use std::collections::HashSet;

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};

/// Components that contain at least one cycle.
#[must_use]
pub fn big_sccs(graph: &DiGraph<String, ()>) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.contains_edge(node, node))
        })
        .collect()
}

/// Induced subgraph on `members`, keeping node labels.
#[must_use]
pub fn induced_subgraph(graph: &DiGraph<String, ()>, members: &[NodeIndex]) -> DiGraph<String, ()> {
    let member_set: HashSet<NodeIndex> = members.iter().copied().collect();
    graph.filter_map(
        |idx, label| member_set.contains(&idx).then(|| label.clone()),
        |_, _| Some(()),
    )
}

/// Induced subgraphs of every big component.
#[must_use]
pub fn big_scc_subgraphs(graph: &DiGraph<String, ()>) -> Vec<DiGraph<String, ()>> {
    big_sccs(graph)
        .iter()
        .map(|component| induced_subgraph(graph, component))
        .collect()
}

/// Whether the edge `source -> target` lies on a cycle of `graph`.
#[must_use]
pub fn on_cycle(graph: &DiGraph<String, ()>, source: NodeIndex, target: NodeIndex) -> bool {
    graph.contains_edge(source, target) && has_path_connecting(graph, target, source, None)
}

/// Node label; empty for an index that is not in the graph.
#[must_use]
pub fn label(graph: &DiGraph<String, ()>, idx: NodeIndex) -> &str {
    graph.node_weight(idx).map_or("", String::as_str)
}
