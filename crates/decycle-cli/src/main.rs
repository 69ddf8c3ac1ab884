#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use decycle_core::config::{self, DecycleConfig};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "decycle: break cycles in dependency graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: `decycle.toml` in the working directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }

    fn load_config(&self) -> anyhow::Result<DecycleConfig> {
        match &self.config {
            Some(path) => config::load_config(path),
            None => {
                let cwd = env::current_dir().context("Failed to resolve working directory")?;
                config::load_config_in(&cwd)
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graphs",
        about = "Break cycles in an edge-list graph",
        long_about = "Load an edge-list graph, run a cycle-breaking strategy (or all of them), \
                      and print the edges to remove. With a ground-truth file, also report \
                      precision, recall and F1.",
        after_help = "EXAMPLES:\n    # Break cycles with the default strategy\n    decycle break-cycles -g graph.txt\n\n    # Compare every strategy against ground truth\n    decycle break-cycles -g graph.txt -t truth.txt -m all\n\n    # String node ids, machine-readable output\n    decycle break-cycles -g graph.txt -n str --json"
    )]
    BreakCycles(cmd::break_cycles::BreakCyclesArgs),

    #[command(
        next_help_heading = "Packages",
        about = "Break cycles among installed packages",
        long_about = "Run the dependency report tool (pipdeptree by default), extract package \
                      edges, and print the dependency edges to remove, by package name.",
        after_help = "EXAMPLES:\n    # Inspect the current environment\n    decycle break-package-cycles\n\n    # Use a saved report\n    decycle break-package-cycles --input deps.json\n\n    # Give a slow tool more time\n    decycle break-package-cycles --timeout 300"
    )]
    BreakPackageCycles(cmd::packages::PackageCyclesArgs),

    #[command(
        next_help_heading = "Packages",
        about = "Print package dependency edges",
        long_about = "Extract direct parent/child package edges from a dependency report.",
        after_help = "EXAMPLES:\n    # Edges of a saved report\n    decycle extract-edges --input deps.json\n\n    # Integer edge list plus key table\n    decycle extract-edges --input deps.json --relabel --json"
    )]
    ExtractEdges(cmd::extract::ExtractArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DECYCLE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "decycle=debug,info"
        } else {
            "decycle=info,warn"
        })
    });

    let format = env::var("DECYCLE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    debug!(?config, "loaded configuration");

    match &cli.command {
        Commands::BreakCycles(args) => cmd::break_cycles::run_break_cycles(args, &config, output),
        Commands::BreakPackageCycles(args) => {
            cmd::packages::run_package_cycles(args, &config, output)
        }
        Commands::ExtractEdges(args) => cmd::extract::run_extract(args, &config, output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
