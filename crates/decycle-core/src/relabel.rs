//! Dense integer relabeling of string-keyed edges.
//!
//! Strategies that read integer edge lists get `0..n` ids. Ids are assigned
//! in first-seen order while scanning the edge set (source before target),
//! and the id → key table is kept so results can be mapped back to names.

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

use crate::extract::EdgeSet;

/// An edge between relabeled ids.
pub type IdEdge = (usize, usize);

/// Bidirectional key ↔ id mapping plus the rewritten edge set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relabeling {
    keys: Vec<String>,
    ids: HashMap<String, usize>,
    edges: BTreeSet<IdEdge>,
}

impl Relabeling {
    /// Relabel every key that appears in `edges`.
    #[must_use]
    pub fn from_edges(edges: &EdgeSet) -> Self {
        let mut relabeling = Self::default();
        for (source, target) in edges {
            let s = relabeling.intern(source);
            let t = relabeling.intern(target);
            relabeling.edges.insert((s, t));
        }
        relabeling
    }

    fn intern(&mut self, key: &str) -> usize {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.keys.len();
        self.keys.push(key.to_string());
        self.ids.insert(key.to_string(), id);
        id
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Integer edges, one per original edge.
    #[must_use]
    pub const fn edges(&self) -> &BTreeSet<IdEdge> {
        &self.edges
    }

    /// Id assigned to `key`.
    #[must_use]
    pub fn id(&self, key: &str) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// Original key of `id`.
    #[must_use]
    pub fn key(&self, id: usize) -> Option<&str> {
        self.keys.get(id).map(String::as_str)
    }

    /// Write the integer edges as `"src dst"` lines.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `w`.
    pub fn write_edge_list(&self, w: &mut dyn Write) -> io::Result<()> {
        for (source, target) in &self.edges {
            writeln!(w, "{source} {target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> EdgeSet {
        pairs
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect()
    }

    #[test]
    fn chain_uses_three_consistent_ids() {
        let relabeling = Relabeling::from_edges(&edges(&[("a", "b"), ("b", "c")]));

        assert_eq!(relabeling.len(), 3);
        let a = relabeling.id("a").expect("a");
        let b = relabeling.id("b").expect("b");
        let c = relabeling.id("c").expect("c");
        assert_eq!(relabeling.edges(), &BTreeSet::from([(a, b), (b, c)]));

        let distinct: BTreeSet<usize> = relabeling
            .edges()
            .iter()
            .flat_map(|&(s, t)| [s, t])
            .collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn ids_follow_first_seen_order() {
        let relabeling = Relabeling::from_edges(&edges(&[("b", "a"), ("c", "b")]));

        // BTreeSet scans ("b","a") before ("c","b").
        assert_eq!(relabeling.id("b"), Some(0));
        assert_eq!(relabeling.id("a"), Some(1));
        assert_eq!(relabeling.id("c"), Some(2));
    }

    #[test]
    fn mapping_is_invertible() {
        let relabeling = Relabeling::from_edges(&edges(&[("x", "y"), ("y", "x"), ("y", "z")]));

        for id in 0..relabeling.len() {
            let key = relabeling.key(id).expect("key");
            assert_eq!(relabeling.id(key), Some(id));
        }
        assert_eq!(relabeling.key(relabeling.len()), None);
    }

    #[test]
    fn writes_one_line_per_edge() {
        let relabeling = Relabeling::from_edges(&edges(&[("a", "b"), ("a", "c")]));
        let mut out = Vec::new();

        relabeling.write_edge_list(&mut out).expect("write");

        assert_eq!(String::from_utf8(out).expect("utf8"), "0 1\n0 2\n");
    }

    #[test]
    fn empty_edges_give_empty_relabeling() {
        let relabeling = Relabeling::from_edges(&EdgeSet::new());
        assert!(relabeling.is_empty());
        assert!(relabeling.edges().is_empty());
    }
}
