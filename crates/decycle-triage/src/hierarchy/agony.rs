//! Social-agony levels.
//!
//! An edge `u -> v` between levels `l(u)` and `l(v)` costs
//! `max(l(u) - l(v) + 1, 0)` agony: nothing when it points strictly up the
//! hierarchy, more the further down it points. Levels are seeded with the
//! longest-path layering of the DAG left after dropping DFS back edges, then
//! refined by local-search sweeps that move each node to the level
//! minimising the agony of its incident edges. Sweeps stop when nothing
//! moves or after `max_sweeps`.

use std::collections::BTreeSet;

use decycle_core::config::AgonyConfig;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument, warn};

use super::{Ranker, Scores};
use crate::dfs::dfs_back_edges;
use crate::scc::label;
use crate::strategy::StrategyName;

/// [`Ranker`] backed by [`agony_levels`].
#[derive(Debug, Clone, Default)]
pub struct AgonyRanker {
    config: AgonyConfig,
}

impl AgonyRanker {
    #[must_use]
    pub const fn new(config: AgonyConfig) -> Self {
        Self { config }
    }
}

impl Ranker for AgonyRanker {
    fn name(&self) -> StrategyName {
        StrategyName::SocialAgony
    }

    fn scores(&self, graph: &DiGraph<String, ()>) -> Scores {
        agony_levels(graph, &self.config)
            .into_iter()
            .map(|(node, level)| (node, level as f64))
            .collect()
    }
}

/// Total agony of `graph` under `levels` (indexed by node index).
#[must_use]
pub fn total_agony(graph: &DiGraph<String, ()>, levels: &[i64]) -> i64 {
    graph
        .raw_edges()
        .iter()
        .map(|e| edge_agony(levels[e.source().index()], levels[e.target().index()]))
        .sum()
}

const fn edge_agony(source: i64, target: i64) -> i64 {
    let cost = source - target + 1;
    if cost > 0 { cost } else { 0 }
}

/// Integer level per node label.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn agony_levels(graph: &DiGraph<String, ()>, config: &AgonyConfig) -> Vec<(String, i64)> {
    let mut levels = initial_levels(graph);
    let mut order: Vec<NodeIndex> = graph.node_indices().collect();
    order.sort_unstable_by(|a, b| label(graph, *a).cmp(label(graph, *b)));

    let mut sweeps = 0;
    let mut moved = true;
    while moved && sweeps < config.max_sweeps {
        moved = false;
        sweeps += 1;
        for &node in &order {
            let best = best_level(graph, &levels, node);
            if best != levels[node.index()] {
                levels[node.index()] = best;
                moved = true;
            }
        }
    }

    debug!(sweeps, agony = total_agony(graph, &levels), "agony levels");
    graph
        .node_indices()
        .map(|node| (graph[node].clone(), levels[node.index()]))
        .collect()
}

/// Longest-path layering of `graph` minus its DFS back edges.
fn initial_levels(graph: &DiGraph<String, ()>) -> Vec<i64> {
    let back: BTreeSet<(String, String)> = dfs_back_edges(graph).into_iter().collect();
    let dag = graph.filter_map(
        |_, weight| Some(weight.clone()),
        |edge, _| {
            let (s, t) = graph.edge_endpoints(edge)?;
            let key = (label(graph, s).to_string(), label(graph, t).to_string());
            (!back.contains(&key)).then_some(())
        },
    );

    let mut levels = vec![0_i64; graph.node_count()];
    let Ok(topo) = toposort(&dag, None) else {
        warn!("back-edge removal left a cycle, starting from flat levels");
        return levels;
    };
    for node in topo {
        let next = levels[node.index()] + 1;
        for succ in dag.neighbors_directed(node, Direction::Outgoing) {
            if levels[succ.index()] < next {
                levels[succ.index()] = next;
            }
        }
    }
    levels
}

/// Level for `node` minimising its incident agony with every other level
/// fixed. Keeps the current level unless a candidate is strictly better.
fn best_level(graph: &DiGraph<String, ()>, levels: &[i64], node: NodeIndex) -> i64 {
    let preds: Vec<i64> = graph
        .neighbors_directed(node, Direction::Incoming)
        .filter(|&n| n != node)
        .map(|n| levels[n.index()])
        .collect();
    let succs: Vec<i64> = graph
        .neighbors_directed(node, Direction::Outgoing)
        .filter(|&n| n != node)
        .map(|n| levels[n.index()])
        .collect();

    let cost = |level: i64| -> i64 {
        preds.iter().map(|&p| edge_agony(p, level)).sum::<i64>()
            + succs.iter().map(|&s| edge_agony(level, s)).sum::<i64>()
    };

    // The cost is piecewise linear with breakpoints at p + 1 and s - 1.
    let mut candidates: Vec<i64> = preds
        .iter()
        .map(|p| p + 1)
        .chain(succs.iter().map(|s| s - 1))
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let current = levels[node.index()];
    let mut best = (cost(current), current);
    for level in candidates {
        let c = cost(level);
        if c < best.0 {
            best = (c, level);
        }
    }
    best.1
}
