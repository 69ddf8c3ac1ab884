//! Strategy registry and dispatch.
//!
//! Requests are parsed before anything runs, so an unknown name never
//! executes a strategy. `all` runs every registered strategy in canonical
//! order and returns each result keyed by name.

use std::collections::BTreeMap;
use std::fmt;

use decycle_core::config::DecycleConfig;
use decycle_core::{DecycleError, EdgeSet, Graph};
use tracing::{info, instrument};

use crate::dfs::DfsStrategy;
use crate::ensemble::EnsembleStrategy;
use crate::evaluate::evaluate;
use crate::hierarchy::{AgonyRanker, HierarchyStrategy, PageRankRanker, TrueSkillRanker};
use crate::mfas::MfasStrategy;
use crate::strategy::{CycleBreaker, StrategyName, StrategyRequest, StrategyRun};

/// Results of one dispatch, keyed by strategy.
pub type DispatchResult = BTreeMap<StrategyName, StrategyRun>;

/// Maps strategy names to implementations.
pub struct Dispatcher {
    strategies: BTreeMap<StrategyName, Box<dyn CycleBreaker>>,
}

impl Dispatcher {
    /// A dispatcher with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    /// Every built-in strategy, with ranker parameters from `config`.
    #[must_use]
    pub fn with_config(config: &DecycleConfig) -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(Box::new(DfsStrategy));
        dispatcher.register(Box::new(MfasStrategy));
        dispatcher.register(Box::new(HierarchyStrategy::new(PageRankRanker::new(
            config.pagerank.clone(),
        ))));
        dispatcher.register(Box::new(HierarchyStrategy::new(TrueSkillRanker::new(
            config.trueskill.clone(),
        ))));
        dispatcher.register(Box::new(HierarchyStrategy::new(AgonyRanker::new(
            config.agony.clone(),
        ))));
        dispatcher.register(Box::new(EnsembleStrategy::with_config(config)));
        dispatcher
    }

    /// Register `strategy` under its own name, returning any implementation
    /// it replaces.
    pub fn register(&mut self, strategy: Box<dyn CycleBreaker>) -> Option<Box<dyn CycleBreaker>> {
        self.strategies.insert(strategy.name(), strategy)
    }

    /// Registered names, in canonical order.
    pub fn names(&self) -> impl Iterator<Item = StrategyName> + '_ {
        self.strategies.keys().copied()
    }

    /// Run one strategy on `graph`.
    ///
    /// # Errors
    ///
    /// [`DecycleError::UnknownStrategy`] when `strategy` is not registered;
    /// otherwise whatever the strategy reports.
    #[instrument(skip(self, graph, ground_truth), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn break_cycles(
        &self,
        graph: &Graph,
        ground_truth: Option<&EdgeSet>,
        strategy: StrategyName,
    ) -> Result<StrategyRun, DecycleError> {
        let implementation =
            self.strategies
                .get(&strategy)
                .ok_or_else(|| DecycleError::UnknownStrategy {
                    name: strategy.to_string(),
                })?;

        let mut removed = implementation.removal_set(graph)?;
        removed.sort_unstable();
        removed.dedup();

        let evaluation = ground_truth.map(|gt| evaluate(&removed, gt));
        match &evaluation {
            Some(eval) => info!(
                %strategy,
                removed = removed.len(),
                precision = eval.precision,
                recall = eval.recall,
                f1 = eval.f1,
                "cycles broken"
            ),
            None => info!(%strategy, removed = removed.len(), "cycles broken"),
        }

        Ok(StrategyRun {
            strategy,
            removed,
            evaluation,
        })
    }

    /// Parse `request` and run the named strategy, or every strategy for `all`.
    ///
    /// # Errors
    ///
    /// [`DecycleError::UnknownStrategy`] for a name that does not parse or is
    /// not registered (checked before anything runs); otherwise the first
    /// strategy failure.
    pub fn dispatch(
        &self,
        graph: &Graph,
        ground_truth: Option<&EdgeSet>,
        request: &str,
    ) -> Result<DispatchResult, DecycleError> {
        let names: Vec<StrategyName> = match request.parse::<StrategyRequest>()? {
            StrategyRequest::All => self.names().collect(),
            StrategyRequest::One(name) => {
                if !self.strategies.contains_key(&name) {
                    return Err(DecycleError::UnknownStrategy {
                        name: request.to_string(),
                    });
                }
                vec![name]
            }
        };

        names
            .into_iter()
            .map(|name| {
                self.break_cycles(graph, ground_truth, name)
                    .map(|run| (name, run))
            })
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_config(&DecycleConfig::default())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}
