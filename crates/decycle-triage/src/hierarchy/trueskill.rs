//! TrueSkill ratings from dependency "matches".
//!
//! Every edge `u -> v` is a two-player match won by `v`. Ratings start at
//! `N(mu, sigma²)` and are updated with the two-player, no-draw TrueSkill
//! rules; the dynamics term `tau` is added to each variance before a match.
//! The conservative score `mu - 3 sigma` ranks the nodes.

use decycle_core::config::TrueSkillConfig;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use tracing::{instrument, trace};

use super::{Ranker, Scores};
use crate::scc::label;
use crate::strategy::StrategyName;

/// A Gaussian skill belief.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    /// `mu - 3 sigma`.
    #[must_use]
    pub fn conservative(self) -> f64 {
        3.0f64.mul_add(-self.sigma, self.mu)
    }
}

/// [`Ranker`] backed by [`rate`].
#[derive(Debug, Clone, Default)]
pub struct TrueSkillRanker {
    config: TrueSkillConfig,
}

impl TrueSkillRanker {
    #[must_use]
    pub const fn new(config: TrueSkillConfig) -> Self {
        Self { config }
    }
}

impl Ranker for TrueSkillRanker {
    fn name(&self) -> StrategyName {
        StrategyName::TrueSkill
    }

    fn scores(&self, graph: &DiGraph<String, ()>) -> Scores {
        rate(graph, &self.config)
            .into_iter()
            .map(|(node, rating)| (node, rating.conservative()))
            .collect()
    }
}

/// Replay every edge as a match won by its target, in sorted edge order,
/// `config.passes` times. Self-loops are skipped.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn rate(graph: &DiGraph<String, ()>, config: &TrueSkillConfig) -> Vec<(String, Rating)> {
    let prior = Rating {
        mu: config.mu,
        sigma: config.sigma,
    };
    let mut ratings = vec![prior; graph.node_count()];

    let mut matches: Vec<(&str, &str, usize, usize)> = graph
        .edge_references()
        .filter(|e| e.source() != e.target())
        .map(|e| {
            (
                label(graph, e.source()),
                label(graph, e.target()),
                e.source().index(),
                e.target().index(),
            )
        })
        .collect();
    matches.sort_unstable();

    for _ in 0..config.passes {
        for &(_, _, loser, winner) in &matches {
            let (w, l) = play(ratings[winner], ratings[loser], config);
            ratings[winner] = w;
            ratings[loser] = l;
        }
    }
    trace!(matches = matches.len(), passes = config.passes, "rated");

    graph
        .node_indices()
        .map(|node| (graph[node].clone(), ratings[node.index()]))
        .collect()
}

/// One decisive match; returns the updated `(winner, loser)`.
fn play(winner: Rating, loser: Rating, config: &TrueSkillConfig) -> (Rating, Rating) {
    let tau_sq = config.tau * config.tau;
    let w_var = winner.sigma.mul_add(winner.sigma, tau_sq);
    let l_var = loser.sigma.mul_add(loser.sigma, tau_sq);

    let c_sq = (2.0 * config.beta).mul_add(config.beta, w_var + l_var);
    let c = c_sq.sqrt();
    let t = (winner.mu - loser.mu) / c;
    let v = v_win(t);
    let w = v * (v + t);

    let updated = |r: Rating, var: f64, sign: f64| Rating {
        mu: (sign * var / c).mul_add(v, r.mu),
        sigma: (var * (1.0 - var / c_sq * w).max(f64::EPSILON)).sqrt(),
    };
    (updated(winner, w_var, 1.0), updated(loser, l_var, -1.0))
}

/// Additive mean correction `pdf(t) / cdf(t)` for a win.
fn v_win(t: f64) -> f64 {
    let denom = cdf(t);
    if denom < 1e-300 { -t } else { pdf(t) / denom }
}

fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Complementary error function, Chebyshev fit with fractional error < 1.2e-7.
#[allow(clippy::unreadable_literal, clippy::suboptimal_flops)]
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let r = t * poly.exp();
    if x >= 0.0 { r } else { 2.0 - r }
}
