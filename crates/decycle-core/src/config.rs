use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "decycle.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecycleConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub pagerank: PageRankConfig,
    #[serde(default)]
    pub trueskill: TrueSkillConfig,
    #[serde(default)]
    pub agony: AgonyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Strategy used by `break-cycles` when `--method` is not given.
    #[serde(default = "default_strategy")]
    pub default: String,
    /// Strategy used for installed-package cycles.
    #[serde(default = "default_package_strategy")]
    pub packages: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default: default_strategy(),
            packages: default_package_strategy(),
        }
    }
}

/// External dependency-report tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_tool_program")]
    pub program: String,
    #[serde(default = "default_tool_args")]
    pub args: Vec<String>,
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl ToolConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_tool_program(),
            args: default_tool_args(),
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Configuration for PageRank computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Stop when the L1 norm of the rank delta drops below this.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
        }
    }
}

/// TrueSkill rating parameters (defaults from the original TrueSkill paper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueSkillConfig {
    #[serde(default = "default_mu")]
    pub mu: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// How many times the full match list is replayed.
    #[serde(default = "default_passes")]
    pub passes: usize,
}

impl Default for TrueSkillConfig {
    fn default() -> Self {
        Self {
            mu: default_mu(),
            sigma: default_sigma(),
            beta: default_beta(),
            tau: default_tau(),
            passes: default_passes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgonyConfig {
    /// Upper bound on local-search sweeps over all nodes.
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,
}

impl Default for AgonyConfig {
    fn default() -> Self {
        Self {
            max_sweeps: default_max_sweeps(),
        }
    }
}

/// Load `decycle.toml` from `dir`; a missing file yields defaults.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_config_in(dir: &Path) -> Result<DecycleConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(DecycleConfig::default());
    }
    load_config(&path)
}

/// Load an explicit config file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid config TOML.
pub fn load_config(path: &Path) -> Result<DecycleConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_strategy() -> String {
    "ensembling".to_string()
}

fn default_package_strategy() -> String {
    "mfas".to_string()
}

fn default_tool_program() -> String {
    "pipdeptree".to_string()
}

fn default_tool_args() -> Vec<String> {
    vec!["--json".to_string()]
}

const fn default_tool_timeout_secs() -> u64 {
    120
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    100
}

const fn default_mu() -> f64 {
    25.0
}

const fn default_sigma() -> f64 {
    25.0 / 3.0
}

const fn default_beta() -> f64 {
    25.0 / 6.0
}

const fn default_tau() -> f64 {
    25.0 / 300.0
}

const fn default_passes() -> usize {
    3
}

const fn default_max_sweeps() -> usize {
    50
}
