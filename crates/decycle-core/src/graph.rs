//! Directed graph construction from plain-text edge lists.
//!
//! # Format
//!
//! One edge per line, source then target, separated by whitespace:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! 1 2
//! 2 3
//! 3 1
//! ```
//!
//! Node identifiers are kept as strings. With [`NodeType::Int`] every
//! identifier must also parse as an integer and is stored in canonical form,
//! so `01`, `+1` and `1` name the same node.
//!
//! ## Cache Invalidation
//!
//! [`Graph::content_hash`] is a BLAKE3 hash of the sorted edge list, so two
//! files describing the same edge set hash equally.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{DecycleError, LineNo};
use crate::extract::{Edge, EdgeSet};

/// How node identifiers in an edge list are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Identifiers must be integers.
    #[default]
    Int,
    /// Identifiers are arbitrary tokens.
    Str,
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            other => Err(format!("unknown node type '{other}' (expected int or str)")),
        }
    }
}

/// A directed graph keyed by node label.
///
/// Duplicate edges collapse; self-loops are kept.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Directed graph: nodes = labels, edges = dependency relationships.
    pub graph: DiGraph<String, ()>,
    /// Mapping from label to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the sorted edge set.
    pub content_hash: String,
}

impl Graph {
    /// Build a graph from labelled edges.
    #[must_use]
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for (source, target) in edges {
            let s = *node_map
                .entry(source.to_string())
                .or_insert_with(|| graph.add_node(source.to_string()));
            let t = *node_map
                .entry(target.to_string())
                .or_insert_with(|| graph.add_node(target.to_string()));

            // Avoid duplicate edges (petgraph allows them by default).
            if !graph.contains_edge(s, t) {
                graph.add_edge(s, t, ());
            }
        }

        let mut built = Self {
            graph,
            node_map,
            content_hash: String::new(),
        };
        built.content_hash = compute_edge_hash(&built.edge_set());
        built
    }

    /// Build a graph from an [`EdgeSet`].
    #[must_use]
    pub fn from_edge_set(edges: &EdgeSet) -> Self {
        Self::from_edges(edges.iter().map(|(s, t)| (s.as_str(), t.as_str())))
    }

    /// Load an edge-list file.
    ///
    /// # Errors
    ///
    /// Returns [`DecycleError::GraphLoad`] if the file cannot be opened or
    /// read, or a line does not hold exactly two valid identifiers.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_edge_list_file(path: &Path, node_type: NodeType) -> Result<Self, DecycleError> {
        let edges = read_edge_list(path, node_type)?;
        let graph = Self::from_edge_set(&edges);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            hash = %graph.content_hash,
            "loaded edge list"
        );
        Ok(graph)
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a label.
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(label).copied()
    }

    /// Return the label of a node.
    #[must_use]
    pub fn label(&self, idx: NodeIndex) -> &str {
        self.graph.node_weight(idx).map_or("", String::as_str)
    }

    /// Whether `source -> target` is an edge of the graph.
    #[must_use]
    pub fn contains(&self, source: &str, target: &str) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(s), Some(t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    /// All edges as labelled pairs.
    #[must_use]
    pub fn edge_set(&self) -> EdgeSet {
        self.graph
            .edge_references()
            .map(|e| self.labelled(e.source(), e.target()))
            .collect()
    }

    /// Labelled form of an index pair.
    #[must_use]
    pub fn labelled(&self, source: NodeIndex, target: NodeIndex) -> Edge {
        (self.label(source).to_string(), self.label(target).to_string())
    }

    /// Whether the graph contains at least one directed cycle (self-loops count).
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Copy of the graph without the given edges.
    #[must_use]
    pub fn without_edges(&self, removed: &[Edge]) -> Self {
        let removed: EdgeSet = removed.iter().cloned().collect();
        let kept: Vec<Edge> = self.edge_set().difference(&removed).cloned().collect();
        let mut graph = Self::from_edges(kept.iter().map(|(s, t)| (s.as_str(), t.as_str())));
        // Keep isolated nodes so node counts stay comparable.
        for label in self.graph.node_weights() {
            if !graph.node_map.contains_key(label) {
                let idx = graph.graph.add_node(label.clone());
                graph.node_map.insert(label.clone(), idx);
            }
        }
        graph
    }
}

/// Read an edge-list file into a deduplicated edge set.
///
/// Ground-truth files share the graph format and are read with this too.
///
/// # Errors
///
/// Returns [`DecycleError::GraphLoad`] naming the file (and line, when the
/// problem is a specific line).
pub fn read_edge_list(path: &Path, node_type: NodeType) -> Result<EdgeSet, DecycleError> {
    let file = File::open(path).map_err(|err| {
        let reason = if err.kind() == ErrorKind::NotFound {
            "file not found".to_string()
        } else {
            err.to_string()
        };
        load_error(path, None, reason)
    })?;
    parse_edge_list(BufReader::new(file), path, node_type)
}

/// Parse edge-list text from any reader; `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`DecycleError::GraphLoad`] on read failures or malformed lines.
pub fn parse_edge_list<R: BufRead>(
    reader: R,
    origin: &Path,
    node_type: NodeType,
) -> Result<EdgeSet, DecycleError> {
    let mut edges = EdgeSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| load_error(origin, Some(line_no), err.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [source, target] = fields.as_slice() else {
            return Err(load_error(
                origin,
                Some(line_no),
                format!("expected 2 fields, found {}", fields.len()),
            ));
        };

        let label = |id: &str| -> Result<String, DecycleError> {
            match node_type {
                NodeType::Str => Ok(id.to_string()),
                NodeType::Int => id.parse::<i64>().map(|n| n.to_string()).map_err(|_| {
                    load_error(
                        origin,
                        Some(line_no),
                        format!("node id '{id}' is not an integer"),
                    )
                }),
            }
        };

        edges.insert((label(*source)?, label(*target)?));
    }

    Ok(edges)
}

fn load_error(path: &Path, line: Option<usize>, reason: String) -> DecycleError {
    DecycleError::GraphLoad {
        path: PathBuf::from(path),
        line: LineNo(line),
        reason,
    }
}

/// Compute a BLAKE3 hash of the sorted edge list.
fn compute_edge_hash(edges: &EdgeSet) -> String {
    let mut hasher = blake3::Hasher::new();
    for (source, target) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str, node_type: NodeType) -> Result<EdgeSet, DecycleError> {
        parse_edge_list(Cursor::new(text), Path::new("mem.txt"), node_type)
    }

    #[test]
    fn parses_edges_skipping_blanks_and_comments() {
        let edges = parse("# header\n1 2\n\n2\t3\n  3   1  \n", NodeType::Int).expect("parse");
        assert_eq!(edges.len(), 3);
        assert!(edges.contains(&("2".to_string(), "3".to_string())));
    }

    #[test]
    fn rejects_wrong_field_count_with_line_number() {
        let err = parse("1 2\n3\n", NodeType::Int).expect_err("must fail");
        match err {
            DecycleError::GraphLoad { line, reason, .. } => {
                assert_eq!(line, LineNo(Some(2)));
                assert!(reason.contains("found 1"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = parse("1 2 3\n", NodeType::Int).expect_err("must fail");
        assert!(err.to_string().contains("mem.txt:1"), "{err}");
    }

    #[test]
    fn int_node_type_rejects_non_integer_ids() {
        let err = parse("a b\n", NodeType::Int).expect_err("must fail");
        assert!(err.to_string().contains("'a' is not an integer"), "{err}");

        let edges = parse("a b\n", NodeType::Str).expect("str ids are fine");
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn int_ids_are_canonicalised() {
        let edges = parse("01 2\n1 +2\n-0 1\n", NodeType::Int).expect("parse");
        assert_eq!(
            edges,
            EdgeSet::from([
                ("0".to_string(), "1".to_string()),
                ("1".to_string(), "2".to_string()),
            ])
        );

        let raw = parse("01 2\n1 2\n", NodeType::Str).expect("parse");
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = read_edge_list(Path::new("/definitely/not/here.txt"), NodeType::Int)
            .expect_err("must fail");
        assert!(matches!(err, DecycleError::GraphLoad { line: LineNo(None), .. }));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn graph_collapses_duplicate_edges_and_keeps_self_loops() {
        let graph = Graph::from_edges([("a", "b"), ("a", "b"), ("c", "c")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains("c", "c"));
        assert!(graph.is_cyclic());
    }

    #[test]
    fn content_hash_depends_only_on_edge_set() {
        let one = Graph::from_edges([("a", "b"), ("b", "c")]);
        let two = Graph::from_edges([("b", "c"), ("a", "b"), ("a", "b")]);
        let three = Graph::from_edges([("a", "b")]);
        assert_eq!(one.content_hash, two.content_hash);
        assert_ne!(one.content_hash, three.content_hash);
        assert!(one.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn without_edges_breaks_cycle_and_keeps_nodes() {
        let graph = Graph::from_edges([("a", "b"), ("b", "a"), ("c", "a")]);
        let pruned = graph.without_edges(&[("b".to_string(), "a".to_string())]);
        assert!(!pruned.is_cyclic());
        assert_eq!(pruned.node_count(), 3);
        assert_eq!(pruned.edge_count(), 2);
    }

    #[test]
    fn node_type_parses() {
        assert_eq!("int".parse::<NodeType>(), Ok(NodeType::Int));
        assert_eq!("str".parse::<NodeType>(), Ok(NodeType::Str));
        assert!("float".parse::<NodeType>().is_err());
    }
}
