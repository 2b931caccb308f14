use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use flowcalc_core::{ChainConfig, DurationMode};
use tokio::fs::File;
use tracing_subscriber::EnvFilter;

mod runner;
mod summary;

/// CLI wrapper for DurationMode (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliMode {
    Fractional,
    Integer,
}

impl From<CliMode> for DurationMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Fractional => DurationMode::Fractional,
            CliMode::Integer => DurationMode::Integer,
        }
    }
}

#[derive(Parser)]
#[command(name = "flowcalc")]
#[command(about = "Enrich NDJSON flow events with lifecycle duration and throughput")]
struct Cli {
    /// NDJSON input file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// YAML filter configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Duration output mode, overrides the config file
    #[arg(short, long)]
    mode: Option<CliMode>,

    /// Do not write flow-lifecycle.total_bytes
    #[arg(long)]
    no_total_bytes: bool,

    /// Log recoverable filter failures (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ChainConfig> {
    let mut config = match &cli.config {
        Some(path) => ChainConfig::from_path(path)?,
        None => ChainConfig::default(),
    };

    if let Some(mode) = cli.mode.clone() {
        config.duration.mode = mode.into();
    }
    if cli.no_total_bytes {
        config.throughput.include_total_bytes = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let chain = match load_config(&cli).and_then(|config| config.build_chain()) {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let stdout = tokio::io::stdout();
    let report = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            runner::run(file, stdout, &chain).await?
        }
        None => runner::run(tokio::io::stdin(), stdout, &chain).await?,
    };

    eprint!("{}", summary::format_summary(&report, &chain.stats()));

    Ok(())
}
