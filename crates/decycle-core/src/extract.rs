//! Dependency forest → directed edge set.
//!
//! # Edge Direction
//!
//! An edge `(parent, child)` means "parent depends on child". Only direct
//! parent/child pairs are recorded, once per occurrence in the forest; the
//! [`EdgeSet`] collapses repeats.
//!
//! # Traversal
//!
//! The walk is iterative. Each root is expanded with an explicit stack of
//! frames `(node, position in parent list, next child index)`. The sequence of
//! positions on the stack is the node's [`NodePath`]. On every step the top
//! frame either yields its next child (record edge, push child) or is
//! exhausted (pop, parent resumes with its next child). Depth is bounded by
//! heap memory, not by the call stack.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::error::{DecycleError, NodePath};
use crate::forest::ForestNode;

/// A directed `(parent, child)` dependency pair.
pub type Edge = (String, String);

/// Deduplicated edges with deterministic iteration order.
pub type EdgeSet = BTreeSet<Edge>;

/// Destination for extracted edges.
///
/// Extraction hands edges to the sink only after the whole forest has been
/// walked successfully, so a failed extraction never commits anything.
pub trait EdgeSink {
    /// Accept one edge. Duplicates may be offered.
    fn commit(&mut self, edge: Edge);
}

impl EdgeSink for EdgeSet {
    fn commit(&mut self, edge: Edge) {
        self.insert(edge);
    }
}

impl EdgeSink for Vec<Edge> {
    fn commit(&mut self, edge: Edge) {
        self.push(edge);
    }
}

struct Frame<'a> {
    node: &'a ForestNode,
    key: &'a str,
    position: usize,
    next_child: usize,
}

/// Extract the deduplicated dependency edge set of `forest`.
///
/// # Errors
///
/// Returns [`DecycleError::MalformedNode`] for the first node (in walk order)
/// whose key cannot be resolved. No edges are returned in that case.
pub fn extract_edges(forest: &[ForestNode]) -> Result<EdgeSet, DecycleError> {
    let mut edges = EdgeSet::new();
    extract_edges_into(forest, &mut edges)?;
    Ok(edges)
}

/// Walk `forest` and commit its edges to `sink` once the walk has succeeded.
///
/// # Errors
///
/// Returns [`DecycleError::MalformedNode`] when any node lacks a key; `sink`
/// is left untouched.
#[instrument(skip_all, fields(roots = forest.len()))]
pub fn extract_edges_into<S: EdgeSink + ?Sized>(
    forest: &[ForestNode],
    sink: &mut S,
) -> Result<(), DecycleError> {
    let mut pending = EdgeSet::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut max_depth = 0;

    for (root_pos, root) in forest.iter().enumerate() {
        let root_key = resolve_key(root, &stack, root_pos)?;
        stack.push(Frame {
            node: root,
            key: root_key,
            position: root_pos,
            next_child: 0,
        });

        while let Some(top) = stack.last_mut() {
            let node = top.node;
            let parent_key = top.key;
            let child_pos = top.next_child;

            let Some(child) = node.dependencies().get(child_pos) else {
                // Children exhausted: backtrack, the parent advances on its next turn.
                stack.pop();
                continue;
            };
            top.next_child += 1;

            let child_key = resolve_key(child, &stack, child_pos)?;
            pending.insert((parent_key.to_string(), child_key.to_string()));

            stack.push(Frame {
                node: child,
                key: child_key,
                position: child_pos,
                next_child: 0,
            });
            max_depth = max_depth.max(stack.len());
        }
    }

    debug!(edges = pending.len(), max_depth, "extracted dependency edges");

    for edge in pending {
        sink.commit(edge);
    }
    Ok(())
}

fn resolve_key<'a>(
    node: &'a ForestNode,
    stack: &[Frame<'_>],
    position: usize,
) -> Result<&'a str, DecycleError> {
    node.key().ok_or_else(|| {
        let mut path: Vec<usize> = stack.iter().map(|frame| frame.position).collect();
        path.push(position);
        DecycleError::MalformedNode {
            path: NodePath(path),
        }
    })
}
