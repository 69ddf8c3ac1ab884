pub mod break_cycles;
pub mod extract;
pub mod packages;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use decycle_core::config::ToolConfig;
use decycle_core::{CommandSource, FileSource, ForestSource};

/// Where the dependency forest comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct ForestArgs {
    /// Read the forest from a JSON file instead of running the report tool.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Seconds to wait for the report tool (overrides `tool.timeout_secs`).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ForestArgs {
    /// The configured report tool, or the `--input` file.
    pub fn source(&self, tool: &ToolConfig) -> Box<dyn ForestSource> {
        match &self.input {
            Some(path) => Box::new(FileSource::new(path)),
            None => {
                let timeout = self.timeout.map_or_else(|| tool.timeout(), Duration::from_secs);
                Box::new(CommandSource::new(
                    tool.program.clone(),
                    tool.args.clone(),
                    timeout,
                ))
            }
        }
    }
}
