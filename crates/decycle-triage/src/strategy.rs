//! Strategy names and the uniform cycle-breaking interface.

use std::fmt;
use std::str::FromStr;

use decycle_core::{DecycleError, Edge, Graph};
use serde::Serialize;

use crate::evaluate::Evaluation;

/// The closed set of cycle-breaking strategies.
///
/// Declaration order is the canonical run order for `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    /// Back edges of a depth-first search.
    Dfs,
    /// Greedy minimum feedback arc set (Eades–Lin–Smyth ordering).
    Mfas,
    /// Hierarchy removal driven by PageRank scores.
    PageRank,
    /// Hierarchy removal driven by TrueSkill ratings.
    TrueSkill,
    /// Hierarchy removal driven by social-agony levels.
    SocialAgony,
    /// Vote across the hierarchy strategies.
    Ensembling,
}

impl StrategyName {
    /// Every strategy, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Dfs,
        Self::Mfas,
        Self::PageRank,
        Self::TrueSkill,
        Self::SocialAgony,
        Self::Ensembling,
    ];

    /// Stable command-line / JSON spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dfs => "dfs",
            Self::Mfas => "mfas",
            Self::PageRank => "pagerank",
            Self::TrueSkill => "trueskill",
            Self::SocialAgony => "socialagony",
            Self::Ensembling => "ensembling",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = DecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| DecycleError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

/// What a caller asked the dispatcher to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyRequest {
    One(StrategyName),
    /// Every registered strategy.
    All,
}

impl FromStr for StrategyRequest {
    type Err = DecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

/// A cycle-breaking algorithm.
///
/// Implementations return the edges whose removal leaves `graph` acyclic.
/// Returned edges must exist in `graph`; order and duplicates are normalised
/// by the dispatcher.
pub trait CycleBreaker {
    /// Dispatch key this implementation answers to.
    fn name(&self) -> StrategyName;

    /// Compute the edges to remove.
    ///
    /// # Errors
    ///
    /// Implementations backed by an external process report its failure as
    /// [`DecycleError::ExternalTool`].
    fn removal_set(&self, graph: &Graph) -> Result<Vec<Edge>, DecycleError>;
}

/// Outcome of running one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRun {
    pub strategy: StrategyName,
    /// Sorted, deduplicated edges to remove.
    pub removed: Vec<Edge>,
    /// Accuracy against ground truth, when ground truth was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}
