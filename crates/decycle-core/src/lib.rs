#![forbid(unsafe_code)]
//! decycle-core library.
//!
//! # Conventions
//!
//! - **Errors**: Use [`DecycleError`] for library failures; `anyhow::Result`
//!   only for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod extract;
pub mod forest;
pub mod graph;
pub mod relabel;
pub mod source;

pub use error::{DecycleError, ErrorCode, LineNo, NodePath};
pub use extract::{Edge, EdgeSet, EdgeSink, extract_edges, extract_edges_into};
pub use forest::{Forest, ForestNode, PackageRecord, parse_forest};
pub use graph::{Graph, NodeType, read_edge_list};
pub use relabel::Relabeling;
pub use source::{CommandSource, FileSource, ForestSource, StaticSource};
