//! cherryscout command-line tool.
//!
//! Lists the commits the other ublue-os image tree made recently, skipping
//! automation accounts, and predicts whether each would cherry-pick cleanly
//! onto the current branch.

mod json;
mod style;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cherryscout_core::conflict::MergeStrategy;
use cherryscout_core::models::Project;
use cherryscout_core::report::ReportSink;
use cherryscout_core::signals::setup_signal_handlers;
use cherryscout_core::{Advisor, AdvisorConfig, AdvisorError, AdvisorOptions, AuthorFilter, GitCli};

use json::JsonSink;
use style::Painter;
use terminal::TerminalSink;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Find commits worth cherry-picking between Aurora and Bluefin.
#[derive(Parser, Debug)]
#[command(
    name = "cherryscout",
    version,
    about = "Find recent Aurora/Bluefin commits worth cherry-picking and predict conflicts"
)]
struct Cli {
    /// The project you maintain (aurora or bluefin); the other one is analysed.
    #[arg(long, value_parser = parse_project)]
    ours: Option<Project>,

    /// How many days of history to look at.
    #[arg(short, long)]
    days: Option<u32>,

    /// Skip the cherry-pick compatibility check.
    #[arg(long)]
    no_test: bool,

    /// Include the full diff of every commit.
    #[arg(long)]
    show_diffs: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Emit JSON lines instead of tables.
    #[arg(long)]
    json: bool,

    /// Path to the TOML configuration file (ignored if absent).
    #[arg(short, long, default_value = "~/.config/cherryscout/config.toml")]
    config: String,

    /// Repository to analyse.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Reference the commits would be picked onto.
    #[arg(long)]
    tip: Option<String>,

    /// Branch of the other project to read.
    #[arg(long)]
    branch: Option<String>,

    /// Override the other project's clone URL (mirrors, forks, local paths).
    #[arg(long)]
    remote_url: Option<String>,

    /// Merge simulation: marker-scan or write-tree (git 2.40+).
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<MergeStrategy>,

    /// Print a default configuration file and exit.
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_project(s: &str) -> Result<Project, String> {
    Project::from_str_val(s).ok_or_else(|| format!("unknown project '{s}': use aurora or bluefin"))
}

fn parse_strategy(s: &str) -> Result<MergeStrategy, String> {
    match s {
        "marker-scan" => Ok(MergeStrategy::MarkerScan),
        "write-tree" => Ok(MergeStrategy::WriteTree),
        other => Err(format!(
            "unknown strategy '{other}': use marker-scan or write-tree"
        )),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AdvisorConfig::default_template());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.display.log_level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let painter = Painter::new(config.display.color);
    match run(&cli, config, painter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupt(&e) => {
            eprintln!();
            eprintln!("{}", painter.warn("Interrupted, remaining commits were not analysed"));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn is_interrupt(e: &anyhow::Error) -> bool {
    e.downcast_ref::<AdvisorError>()
        .is_some_and(AdvisorError::is_interrupt)
}

/// Load the config file (if any) and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<AdvisorConfig> {
    let path = expand_tilde(&cli.config);
    let mut config = AdvisorConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {path}"))?;

    if let Some(ours) = cli.ours {
        config.analysis.ours = ours;
    }
    if let Some(days) = cli.days {
        config.analysis.lookback_days = days;
    }
    if let Some(tip) = &cli.tip {
        config.analysis.tip = tip.clone();
    }
    if let Some(branch) = &cli.branch {
        config.analysis.branch = branch.clone();
    }
    if let Some(url) = &cli.remote_url {
        config.remote.url = Some(url.clone());
    }
    if let Some(strategy) = cli.strategy {
        config.merge.strategy = strategy;
    }
    if cli.no_test {
        config.analysis.check_compatibility = false;
    }
    if cli.show_diffs {
        config.analysis.show_diffs = true;
    }
    if cli.no_color {
        config.display.color = false;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run(cli: &Cli, config: AdvisorConfig, painter: Painter) -> Result<()> {
    let shutdown = setup_signal_handlers();
    debug!(repo = %cli.repo.display(), target = %config.target(), "starting analysis");

    let advisor = Advisor::new(GitCli::new(&cli.repo), AdvisorOptions::from_config(&config))
        .with_filter(AuthorFilter::new(config.filter.automation_authors.iter().cloned()))
        .with_shutdown_flag(shutdown);

    let mut sink: Box<dyn ReportSink> = if cli.json {
        Box::new(JsonSink::new(std::io::stdout()))
    } else {
        Box::new(TerminalSink::new(
            std::io::stdout(),
            painter,
            config.display.max_files,
        ))
    };

    advisor
        .run(sink.as_mut())
        .await
        .with_context(|| format!("cherry-pick analysis of {} failed", config.target()))?;
    Ok(())
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
