//! Precision / recall of a removal set against ground truth.

use std::collections::BTreeSet;

use decycle_core::{Edge, EdgeSet};
use serde::Serialize;

/// Accuracy of a removal set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Removed edges that are also in the ground truth.
    pub true_positives: usize,
    pub removed: usize,
    pub ground_truth: usize,
}

/// Compare `removed` with `ground_truth`. Empty denominators give 0.
#[must_use]
pub fn evaluate(removed: &[Edge], ground_truth: &EdgeSet) -> Evaluation {
    let removed: BTreeSet<&Edge> = removed.iter().collect();
    let true_positives = removed.iter().filter(|e| ground_truth.contains(**e)).count();

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(true_positives, removed.len());
    let recall = ratio(true_positives, ground_truth.len());
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Evaluation {
        precision,
        recall,
        f1,
        true_positives,
        removed: removed.len(),
        ground_truth: ground_truth.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|(s, t)| ((*s).to_string(), (*t).to_string())).collect()
    }

    #[test]
    fn perfect_match() {
        let removed = edges(&[("a", "b"), ("c", "d")]);
        let gt: EdgeSet = removed.iter().cloned().collect();

        let eval = evaluate(&removed, &gt);

        assert!((eval.precision - 1.0).abs() < f64::EPSILON);
        assert!((eval.recall - 1.0).abs() < f64::EPSILON);
        assert!((eval.f1 - 1.0).abs() < f64::EPSILON);
        assert_eq!(eval.true_positives, 2);
    }

    #[test]
    fn partial_overlap() {
        let removed = edges(&[("a", "b"), ("x", "y")]);
        let gt: EdgeSet = edges(&[("a", "b"), ("c", "d"), ("e", "f"), ("g", "h")])
            .into_iter()
            .collect();

        let eval = evaluate(&removed, &gt);

        assert!((eval.precision - 0.5).abs() < 1e-12);
        assert!((eval.recall - 0.25).abs() < 1e-12);
        assert!((eval.f1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sets_score_zero() {
        let eval = evaluate(&[], &EdgeSet::new());
        assert!(eval.precision.abs() < f64::EPSILON);
        assert!(eval.recall.abs() < f64::EPSILON);
        assert!(eval.f1.abs() < f64::EPSILON);
    }

    #[test]
    fn duplicates_in_removal_count_once() {
        let removed = edges(&[("a", "b"), ("a", "b")]);
        let gt: EdgeSet = edges(&[("a", "b")]).into_iter().collect();
        let eval = evaluate(&removed, &gt);
        assert_eq!(eval.removed, 1);
        assert!((eval.precision - 1.0).abs() < f64::EPSILON);
    }
}
