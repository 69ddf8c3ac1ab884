//! `decycle break-cycles`: remove cycle edges from an edge-list graph.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use decycle_core::config::DecycleConfig;
use decycle_core::{Graph, NodeType, read_edge_list};
use decycle_triage::{Dispatcher, StrategyRun};
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `decycle break-cycles`.
#[derive(Args, Debug)]
pub struct BreakCyclesArgs {
    /// Edge-list file: one `source target` pair per line.
    #[arg(short = 'g', long, value_name = "FILE")]
    pub graph: PathBuf,

    /// Ground-truth edge list to score the removal against.
    #[arg(short = 't', long, value_name = "FILE")]
    pub ground_truth: Option<PathBuf>,

    /// Strategy name, or `all` (default: `strategy.default` from config).
    #[arg(short = 'm', long, value_name = "STRATEGY")]
    pub method: Option<String>,

    /// How node ids are interpreted: `int` or `str`.
    #[arg(short = 'n', long, value_name = "TYPE", default_value = "int")]
    pub node_type: NodeType,
}

#[derive(Debug, Serialize)]
struct BreakCyclesOutput {
    graph: String,
    nodes: usize,
    edges: usize,
    content_hash: String,
    results: Vec<StrategyRun>,
}

/// Execute `decycle break-cycles`.
pub fn run_break_cycles(
    args: &BreakCyclesArgs,
    config: &DecycleConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let graph = Graph::from_edge_list_file(&args.graph, args.node_type)?;
    let ground_truth = args
        .ground_truth
        .as_deref()
        .map(|path| read_edge_list(path, args.node_type))
        .transpose()?;
    let method = args.method.as_deref().unwrap_or(&config.strategy.default);

    let results = Dispatcher::with_config(config).dispatch(&graph, ground_truth.as_ref(), method)?;

    let payload = BreakCyclesOutput {
        graph: args.graph.display().to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        content_hash: graph.content_hash,
        results: results.into_values().collect(),
    };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &BreakCyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for run in &payload.results {
        if let Some(eval) = &run.evaluation {
            writeln!(
                w,
                "# {} precision={:.4} recall={:.4} f1={:.4}",
                run.strategy, eval.precision, eval.recall, eval.f1
            )?;
        }
        for (source, target) in &run.removed {
            writeln!(w, "{} {source} {target}", run.strategy)?;
        }
    }
    Ok(())
}

fn render_pretty(payload: &BreakCyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Break cycles: {}", payload.graph))?;
    pretty_kv(w, "nodes", payload.nodes.to_string())?;
    pretty_kv(w, "edges", payload.edges.to_string())?;
    pretty_kv(w, "hash", &payload.content_hash)?;

    for run in &payload.results {
        writeln!(w)?;
        writeln!(w, "{} removed {} edge(s)", run.strategy, run.removed.len())?;
        for (source, target) in &run.removed {
            writeln!(w, "  {source} -> {target}")?;
        }
        if let Some(eval) = &run.evaluation {
            pretty_kv(w, "  precision", format!("{:.4}", eval.precision))?;
            pretty_kv(w, "  recall", format!("{:.4}", eval.recall))?;
            pretty_kv(w, "  f1", format!("{:.4}", eval.f1))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use decycle_triage::{Evaluation, StrategyName};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: BreakCyclesArgs,
    }

    fn sample() -> BreakCyclesOutput {
        BreakCyclesOutput {
            graph: "g.txt".to_string(),
            nodes: 3,
            edges: 3,
            content_hash: "blake3:abc".to_string(),
            results: vec![StrategyRun {
                strategy: StrategyName::Dfs,
                removed: vec![("3".to_string(), "1".to_string())],
                evaluation: Some(Evaluation {
                    precision: 1.0,
                    recall: 0.5,
                    f1: 2.0 / 3.0,
                    true_positives: 1,
                    removed: 1,
                    ground_truth: 2,
                }),
            }],
        }
    }

    #[test]
    fn args_parse_short_flags() {
        let parsed = Wrapper::parse_from(["test", "-g", "g.txt", "-t", "gt.txt", "-m", "all", "-n", "str"]);
        assert_eq!(parsed.args.graph, PathBuf::from("g.txt"));
        assert_eq!(parsed.args.ground_truth, Some(PathBuf::from("gt.txt")));
        assert_eq!(parsed.args.method.as_deref(), Some("all"));
        assert_eq!(parsed.args.node_type, NodeType::Str);
    }

    #[test]
    fn node_type_defaults_to_int() {
        let parsed = Wrapper::parse_from(["test", "--graph", "g.txt"]);
        assert_eq!(parsed.args.node_type, NodeType::Int);
        assert!(parsed.args.method.is_none());
    }

    #[test]
    fn bad_node_type_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "-g", "g.txt", "-n", "float"]).is_err());
    }

    #[test]
    fn text_lists_one_edge_per_line() {
        let mut out = Vec::new();
        render_text(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("dfs 3 1\n"));
        assert!(rendered.contains("# dfs precision=1.0000 recall=0.5000 f1=0.6667"));
    }

    #[test]
    fn pretty_shows_counts_and_edges() {
        let mut out = Vec::new();
        render_pretty(&sample(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("Break cycles: g.txt"));
        assert!(rendered.contains("dfs removed 1 edge(s)"));
        assert!(rendered.contains("3 -> 1"));
    }
}
