#![forbid(unsafe_code)]
//! decycle-triage library.
//!
//! Cycle-breaking strategies over a [`decycle_core::Graph`] and the
//! [`Dispatcher`] that selects among them by name.
//!
//! # Conventions
//!
//! - **Determinism**: strategies visit nodes and edges in label order, so
//!   the same graph always yields the same removal set.
//! - **Scope**: work is confined to strongly connected components with a
//!   cycle; edges outside them are never removed.
//! - **Errors**: Use [`decycle_core::DecycleError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod dfs;
pub mod dispatch;
pub mod ensemble;
pub mod evaluate;
pub mod hierarchy;
pub mod mfas;
pub mod scc;
pub mod strategy;

pub use dfs::DfsStrategy;
pub use dispatch::{DispatchResult, Dispatcher};
pub use ensemble::EnsembleStrategy;
pub use evaluate::{Evaluation, evaluate};
pub use hierarchy::{HierarchyStrategy, Ranker};
pub use mfas::MfasStrategy;
pub use strategy::{CycleBreaker, StrategyName, StrategyRequest, StrategyRun};
