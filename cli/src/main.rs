//! CLI entrypoint for LLM Consortium
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consortium_application::{
    InteractionLogger, NoProgress, ProgressNotifier, RunConsortiumUseCase,
};
use consortium_domain::{OrchestrationOutcome, OutputFormat};
use consortium_infrastructure::{
    CommandAgentGateway, ConfigLoader, FileConfig, JsonlInteractionLogger,
};
use consortium_presentation::{
    Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; stdout is reserved for results
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_cli_overrides(&cli, &mut file_config);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", toml::to_string_pretty(&file_config)?);
        return Ok(ExitCode::SUCCESS);
    }

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    let Some(prompt) = cli.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
        bail!("A prompt is required.");
    };

    let config = file_config
        .consortium
        .to_consortium_config()
        .context("Invalid consortium configuration")?;
    if config.agents.is_empty() {
        bail!("No usable agents: pass -m/--agent or set [consortium].agents");
    }

    info!("Starting LLM Consortium");

    // === Dependency Injection ===
    let gateway = Arc::new(CommandAgentGateway::from_config(&file_config.gateway)?);
    let mut use_case = RunConsortiumUseCase::new(gateway, config)?;

    if let Some(path) = &file_config.logging.interaction_log {
        match JsonlInteractionLogger::open(path) {
            Ok(logger) => {
                info!("Recording runs to {}", logger.path().display());
                let logger: Arc<dyn InteractionLogger> = Arc::new(logger);
                use_case = use_case.with_logger(logger);
            }
            Err(e) => warn!("Interaction log disabled ({}): {}", path.display(), e),
        }
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet || !file_config.output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let context = match &cli.context {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let result = use_case
        .orchestrate_with_context(prompt, context.as_deref(), progress.as_ref())
        .await?;
    info!("Consortium {} finished", result.metadata.consortium_id);

    if let Some(path) = &cli.output {
        std::fs::write(path, ConsoleFormatter::format_json(&result))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote result to {}", path.display());
    }

    let format: OutputFormat = file_config.output.format.unwrap_or_default();
    println!("{}", ConsoleFormatter.render(&result, format));

    Ok(match result.metadata.outcome {
        OrchestrationOutcome::NoUsableResponses => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    })
}

/// Command-line flags override file values
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    let consortium = &mut config.consortium;

    if !cli.agents.is_empty() {
        consortium.agents = cli.agents.clone();
    }
    if let Some(arbiter) = &cli.arbiter {
        consortium.arbiter = Some(arbiter.clone());
    }
    if let Some(threshold) = cli.confidence_threshold {
        consortium.confidence_threshold = threshold;
    }
    if let Some(min) = cli.min_iterations {
        consortium.min_iterations = min;
    }
    if let Some(max) = cli.max_iterations {
        consortium.max_iterations = max;
    }
    if let Some(strategy) = &cli.strategy {
        consortium.strategy = strategy.clone();
    }
    for (key, value) in &cli.strategy_params {
        consortium.strategy_params.insert_raw(key.clone(), value);
    }
    if let Some(method) = cli.judging_method {
        consortium.judging_method = method;
    }
    if let Some(system) = &cli.system {
        consortium.system_prompt = Some(system.clone());
    }
    if let Some(timeout) = cli.timeout {
        consortium.timeout_seconds = Some(timeout);
    }
    if let Some(policy) = cli.on_empty {
        consortium.on_empty = policy;
    }
    if cli.no_fast_path {
        consortium.fast_path = false;
    }

    if let Some(log) = &cli.log {
        config.logging.interaction_log = Some(log.clone());
    }
    if let Some(format) = cli.format {
        config.output.format = Some(format.into());
    }
}
