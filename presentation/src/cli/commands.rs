//! CLI command definitions

use clap::{Parser, ValueEnum};
use consortium_domain::{EmptyRoundPolicy, JudgingMethod};
use std::path::PathBuf;

/// Output format for consortium results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the final synthesis
    Synthesis,
    /// Every round with responses and verdicts
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for consortium_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Synthesis => Self::Synthesis,
            OutputFormat::Full => Self::Full,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for llm-consortium
#[derive(Parser, Debug)]
#[command(name = "consortium")]
#[command(author, version, about = "LLM Consortium - a panel of models iterates toward a confident answer")]
#[command(long_about = r#"
LLM Consortium sends a prompt to a panel of models, asks an arbiter model to
synthesize their answers, and repeats until the synthesis is confident enough
or the iteration budget runs out.

Each round:
1. Agents: every panel instance answers concurrently, stating its confidence
2. Arbitration: the arbiter combines, picks, or ranks the answers
3. Decide: stop when confident (after the minimum rounds), else refine

Configuration files are loaded from (in priority order):
1. LLM_CONSORTIUM_* environment variables
2. --config <path>        Explicit config file
3. ./consortium.toml      Project-level config
4. ~/.config/llm-consortium/config.toml   Global config

Example:
  consortium -m gpt-4o:2 -m claude-3-5-sonnet --arbiter claude-3-5-sonnet "Is P = NP?"
  consortium -m a -m b -m c --strategy top_k --strategy-param k=2 "Summarize RFC 9110"
"#)]
pub struct Cli {
    /// The prompt to send to the panel
    pub prompt: Option<String>,

    /// Panel agent as NAME or NAME:COUNT (can be specified multiple times)
    #[arg(short = 'm', long = "agent", value_name = "AGENT[:COUNT]")]
    pub agents: Vec<String>,

    /// Agent that synthesizes each round (defaults to the first panel agent)
    #[arg(long, value_name = "AGENT")]
    pub arbiter: Option<String>,

    /// Confidence needed to stop, 0-1 or a percentage
    #[arg(long, value_name = "THRESHOLD")]
    pub confidence_threshold: Option<f64>,

    /// Rounds to run before a synthesis may be accepted
    #[arg(long, value_name = "N")]
    pub min_iterations: Option<usize>,

    /// Hard cap on rounds
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Selection strategy (default, top_k, elimination, rotation)
    #[arg(long, value_name = "NAME")]
    pub strategy: Option<String>,

    /// Strategy parameter as KEY=VALUE (can be specified multiple times)
    #[arg(long = "strategy-param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub strategy_params: Vec<(String, String)>,

    /// How the arbiter judges (synthesis, pick-one, rank)
    #[arg(long, value_name = "METHOD")]
    pub judging_method: Option<JudgingMethod>,

    /// Extra system instructions for every agent
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Per-agent timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// What to do when no agent response is usable (short_circuit, invoke_arbiter)
    #[arg(long, value_name = "POLICY")]
    pub on_empty: Option<EmptyRoundPolicy>,

    /// Always consult the arbiter, even when one answer already meets the threshold
    #[arg(long)]
    pub no_fast_path: bool,

    /// Write the complete result as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Earlier conversation or a reference document shown to every agent
    #[arg(long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Append a JSONL record of the run to this file
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

/// Parse `KEY=VALUE`
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
