//! `decycle break-package-cycles`: break cycles among installed packages.
//!
//! Fetches the dependency forest, extracts package edges, relabels them to
//! dense integer ids in a scratch edge-list file, runs the configured
//! strategy on that file and maps the removed ids back to package names.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::anyhow;
use clap::Args;
use decycle_core::config::DecycleConfig;
use decycle_core::{DecycleError, Graph, NodeType, Relabeling, extract_edges};
use decycle_triage::{Dispatcher, StrategyName};
use serde::Serialize;
use tracing::{debug, info};

use super::ForestArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `decycle break-package-cycles`.
#[derive(Args, Debug)]
pub struct PackageCyclesArgs {
    #[command(flatten)]
    pub forest: ForestArgs,

    /// Strategy name, or `all` (default: `strategy.packages` from config).
    #[arg(short = 'm', long, value_name = "STRATEGY")]
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
struct PackageEdge {
    source_id: usize,
    target_id: usize,
    source: String,
    target: String,
}

#[derive(Debug, Serialize)]
struct PackageRun {
    strategy: StrategyName,
    removed: Vec<PackageEdge>,
}

#[derive(Debug, Serialize)]
struct PackageCyclesOutput {
    packages: usize,
    edges: usize,
    results: Vec<PackageRun>,
}

/// Execute `decycle break-package-cycles`.
pub fn run_package_cycles(
    args: &PackageCyclesArgs,
    config: &DecycleConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let forest = args.forest.source(&config.tool).fetch()?;
    let edges = extract_edges(&forest)?;
    let relabeling = Relabeling::from_edges(&edges);
    info!(
        packages = relabeling.len(),
        edges = edges.len(),
        "extracted package dependencies"
    );

    let scratch = tempfile::TempDir::new().map_err(|source| DecycleError::Io {
        context: "create scratch directory".to_string(),
        source,
    })?;
    let edge_file = scratch.path().join("edges.txt");
    write_edge_list_file(&relabeling, &edge_file)?;
    let graph = Graph::from_edge_list_file(&edge_file, NodeType::Int)?;

    let method = args.method.as_deref().unwrap_or(&config.strategy.packages);
    let results = Dispatcher::with_config(config).dispatch(&graph, None, method)?;

    let results = results
        .into_values()
        .map(|run| {
            let removed = run
                .removed
                .iter()
                .map(|(s, t)| named_edge(&relabeling, s, t))
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(PackageRun {
                strategy: run.strategy,
                removed,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let payload = PackageCyclesOutput {
        packages: relabeling.len(),
        edges: relabeling.edges().len(),
        results,
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn write_edge_list_file(relabeling: &Relabeling, path: &Path) -> Result<(), DecycleError> {
    let io_error = |source| DecycleError::Io {
        context: format!("write {}", path.display()),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    relabeling
        .write_edge_list(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(io_error)?;
    debug!(path = %path.display(), edges = relabeling.edges().len(), "wrote relabeled edge list");
    Ok(())
}

fn named_edge(relabeling: &Relabeling, source: &str, target: &str) -> anyhow::Result<PackageEdge> {
    let lookup = |label: &str| -> anyhow::Result<(usize, String)> {
        let id = label
            .parse::<usize>()
            .map_err(|_| anyhow!("relabeled id '{label}' is not an integer"))?;
        let key = relabeling
            .key(id)
            .ok_or_else(|| anyhow!("relabeled id {id} has no package"))?;
        Ok((id, key.to_string()))
    };
    let (source_id, source) = lookup(source)?;
    let (target_id, target) = lookup(target)?;
    Ok(PackageEdge {
        source_id,
        target_id,
        source,
        target,
    })
}

fn render_text(payload: &PackageCyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for run in &payload.results {
        for edge in &run.removed {
            writeln!(
                w,
                "{} {} {} {} {}",
                run.strategy, edge.source_id, edge.target_id, edge.source, edge.target
            )?;
        }
    }
    Ok(())
}

fn render_pretty(payload: &PackageCyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Package dependency cycles")?;
    pretty_kv(w, "packages", payload.packages.to_string())?;
    pretty_kv(w, "edges", payload.edges.to_string())?;

    for run in &payload.results {
        writeln!(w)?;
        if run.removed.is_empty() {
            writeln!(w, "{}: no cycles found", run.strategy)?;
            continue;
        }
        writeln!(w, "{} removed {} edge(s)", run.strategy, run.removed.len())?;
        for edge in &run.removed {
            writeln!(
                w,
                "  {} -> {}  ({} -> {})",
                edge.source, edge.target, edge.source_id, edge.target_id
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use decycle_core::EdgeSet;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: PackageCyclesArgs,
    }

    fn relabeling() -> Relabeling {
        let edges: EdgeSet = [("flask", "werkzeug"), ("werkzeug", "flask")]
            .iter()
            .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
            .collect();
        Relabeling::from_edges(&edges)
    }

    #[test]
    fn args_parse_forest_flags() {
        let parsed = Wrapper::parse_from(["test", "--input", "deps.json", "--timeout", "5", "-m", "dfs"]);
        assert_eq!(
            parsed.args.forest.input.as_deref(),
            Some(Path::new("deps.json"))
        );
        assert_eq!(parsed.args.forest.timeout, Some(5));
        assert_eq!(parsed.args.method.as_deref(), Some("dfs"));
    }

    #[test]
    fn named_edge_maps_ids_back() {
        let r = relabeling();
        let edge = named_edge(&r, "1", "0").expect("known ids");
        assert_eq!(edge.source, "werkzeug");
        assert_eq!(edge.target, "flask");
        assert_eq!((edge.source_id, edge.target_id), (1, 0));
    }

    #[test]
    fn named_edge_rejects_unknown_ids() {
        let r = relabeling();
        assert!(named_edge(&r, "7", "0").is_err());
        assert!(named_edge(&r, "x", "0").is_err());
    }

    #[test]
    fn edge_list_file_round_trips_through_loader() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("edges.txt");
        let r = relabeling();

        write_edge_list_file(&r, &path).expect("write");
        let graph = Graph::from_edge_list_file(&path, NodeType::Int).expect("load");

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains("0", "1"));
        assert!(graph.contains("1", "0"));
    }

    #[test]
    fn pretty_prints_names_and_ids() {
        let payload = PackageCyclesOutput {
            packages: 2,
            edges: 2,
            results: vec![PackageRun {
                strategy: StrategyName::Mfas,
                removed: vec![named_edge(&relabeling(), "1", "0").expect("edge")],
            }],
        };
        let mut out = Vec::new();
        render_pretty(&payload, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("werkzeug -> flask  (1 -> 0)"));
    }

    #[test]
    fn text_row_carries_ids_and_names() {
        let payload = PackageCyclesOutput {
            packages: 2,
            edges: 2,
            results: vec![PackageRun {
                strategy: StrategyName::Mfas,
                removed: vec![named_edge(&relabeling(), "1", "0").expect("edge")],
            }],
        };
        let mut out = Vec::new();
        render_text(&payload, &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "mfas 1 0 werkzeug flask\n");
    }
}
