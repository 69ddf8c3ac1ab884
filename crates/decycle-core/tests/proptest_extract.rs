use std::collections::BTreeSet;

use decycle_core::{
    DecycleError, Edge, EdgeSink, ForestNode, extract_edges, extract_edges_into, parse_forest,
};
use proptest::prelude::*;
use serde_json::Value;

use generators::*;

/// Reference: every (node, direct child) pair, one entry per occurrence.
fn parent_child_pairs(forest: &[ForestNode]) -> Vec<Edge> {
    let mut pairs = Vec::new();
    let mut todo: Vec<&ForestNode> = forest.iter().collect();
    while let Some(node) = todo.pop() {
        let parent = node.key().expect("generated nodes have keys");
        for child in node.dependencies() {
            pairs.push((
                parent.to_string(),
                child.key().expect("generated nodes have keys").to_string(),
            ));
            todo.push(child);
        }
    }
    pairs
}

fn has_keyless_node(forest: &[ForestNode]) -> bool {
    let mut todo: Vec<&ForestNode> = forest.iter().collect();
    while let Some(node) = todo.pop() {
        if node.key().is_none() {
            return true;
        }
        todo.extend(node.dependencies());
    }
    false
}

/// Spell every absent dependency list as an explicit `null`.
fn null_missing_lists(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(null_missing_lists),
        Value::Object(fields) => {
            match fields.get_mut("dependencies") {
                Some(children) => null_missing_lists(children),
                None => {
                    fields.insert("dependencies".to_string(), Value::Null);
                }
            }
        }
        _ => {}
    }
}

struct CountingSink(usize);

impl EdgeSink for CountingSink {
    fn commit(&mut self, _edge: Edge) {
        self.0 += 1;
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn committed_edges_are_distinct(forest in arb_forest()) {
        let mut committed: Vec<Edge> = Vec::new();
        extract_edges_into(&forest, &mut committed).expect("extract");

        let distinct: BTreeSet<Edge> = committed.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), committed.len());
    }

    #[test]
    fn edges_are_exactly_the_direct_parent_child_pairs(forest in arb_forest()) {
        let edges = extract_edges(&forest).expect("extract");
        let expected: BTreeSet<Edge> = parent_child_pairs(&forest).into_iter().collect();
        prop_assert_eq!(edges, expected);
    }

    #[test]
    fn duplicating_the_forest_changes_nothing(forest in arb_forest()) {
        let once = extract_edges(&forest).expect("extract");
        let mut doubled = forest.clone();
        doubled.extend(forest.iter().cloned());
        let twice = extract_edges(&doubled).expect("extract");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn keyless_nodes_fail_without_partial_output(
        forest in prop::collection::vec(arb_node_maybe_keyless(), 0..5)
    ) {
        let mut sink = CountingSink(0);
        let result = extract_edges_into(&forest, &mut sink);

        if has_keyless_node(&forest) {
            let is_malformed = matches!(result, Err(DecycleError::MalformedNode { .. }));
            prop_assert!(is_malformed);
            prop_assert_eq!(sink.0, 0);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn shaped_forests_survive_json(forest in arb_shaped_forest()) {
        let json = serde_json::to_string(&forest).expect("serialize");
        let parsed = parse_forest(&json).expect("parse");
        prop_assert_eq!(&parsed, &forest);
    }

    #[test]
    fn null_dependency_lists_add_no_edges(forest in arb_shaped_forest()) {
        let mut value = serde_json::to_value(&forest).expect("serialize");
        null_missing_lists(&mut value);
        let parsed = parse_forest(&value.to_string()).expect("parse");

        prop_assert_eq!(
            extract_edges(&parsed).expect("extract"),
            extract_edges(&forest).expect("extract")
        );
    }

    #[test]
    fn shaped_edges_are_the_direct_parent_child_pairs(forest in arb_shaped_forest()) {
        let edges = extract_edges(&forest).expect("extract");
        let expected: BTreeSet<Edge> = parent_child_pairs(&forest).into_iter().collect();
        prop_assert_eq!(edges, expected);
    }
}
