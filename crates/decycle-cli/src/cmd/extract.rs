//! `decycle extract-edges`: print the package dependency edges of a forest.

use std::io::Write;

use clap::Args;
use decycle_core::config::DecycleConfig;
use decycle_core::{Edge, Relabeling, extract_edges};
use serde::Serialize;

use super::ForestArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `decycle extract-edges`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub forest: ForestArgs,

    /// Print dense integer ids instead of package keys.
    #[arg(long)]
    pub relabel: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ExtractOutput {
    Keys { edges: Vec<Edge> },
    Relabeled { edges: Vec<(usize, usize)>, keys: Vec<String> },
}

/// Execute `decycle extract-edges`.
pub fn run_extract(args: &ExtractArgs, config: &DecycleConfig, output: OutputMode) -> anyhow::Result<()> {
    let forest = args.forest.source(&config.tool).fetch()?;
    let edges = extract_edges(&forest)?;

    let payload = if args.relabel {
        let relabeling = Relabeling::from_edges(&edges);
        ExtractOutput::Relabeled {
            edges: relabeling.edges().iter().copied().collect(),
            keys: (0..relabeling.len())
                .filter_map(|id| relabeling.key(id).map(str::to_string))
                .collect(),
        }
    } else {
        ExtractOutput::Keys {
            edges: edges.into_iter().collect(),
        }
    };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &ExtractOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match payload {
        ExtractOutput::Keys { edges } => {
            for (parent, child) in edges {
                writeln!(w, "{parent} {child}")?;
            }
        }
        ExtractOutput::Relabeled { edges, .. } => {
            for (parent, child) in edges {
                writeln!(w, "{parent} {child}")?;
            }
        }
    }
    Ok(())
}

fn render_pretty(payload: &ExtractOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dependency edges")?;
    match payload {
        ExtractOutput::Keys { edges } => {
            pretty_kv(w, "edges", edges.len().to_string())?;
            for (parent, child) in edges {
                writeln!(w, "  {parent} -> {child}")?;
            }
        }
        ExtractOutput::Relabeled { edges, keys } => {
            pretty_kv(w, "packages", keys.len().to_string())?;
            pretty_kv(w, "edges", edges.len().to_string())?;
            for (id, key) in keys.iter().enumerate() {
                writeln!(w, "  {id:>4}  {key}")?;
            }
            writeln!(w)?;
            for (parent, child) in edges {
                writeln!(w, "  {parent} -> {child}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_payload() -> ExtractOutput {
        ExtractOutput::Keys {
            edges: vec![
                ("flask".to_string(), "click".to_string()),
                ("flask".to_string(), "jinja2".to_string()),
            ],
        }
    }

    #[test]
    fn text_prints_pairs() {
        let mut out = Vec::new();
        render_text(&keys_payload(), &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "flask click\nflask jinja2\n");
    }

    #[test]
    fn relabeled_json_carries_key_table() {
        let payload = ExtractOutput::Relabeled {
            edges: vec![(0, 1)],
            keys: vec!["flask".to_string(), "click".to_string()],
        };
        let json = serde_json::to_value(&payload).expect("json");
        assert_eq!(json["edges"][0], serde_json::json!([0, 1]));
        assert_eq!(json["keys"][1], "click");
    }

    #[test]
    fn pretty_counts_edges() {
        let mut out = Vec::new();
        render_pretty(&keys_payload(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("edges:       2"));
        assert!(rendered.contains("flask -> jinja2"));
    }

    #[test]
    fn pretty_relabeled_lists_keys_and_edges() {
        let payload = ExtractOutput::Relabeled {
            edges: vec![(0, 1), (1, 0)],
            keys: vec!["flask".to_string(), "werkzeug".to_string()],
        };
        let mut out = Vec::new();
        render_pretty(&payload, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("   1  werkzeug"), "{rendered}");
        assert!(rendered.contains("  0 -> 1\n"), "{rendered}");
        assert!(rendered.contains("  1 -> 0\n"), "{rendered}");
    }
}
