//! Koradi-Archiver main entry point
//!
//! This is the command-line interface for the Koradi archive mirror.

use anyhow::Context;
use clap::Parser;
use koradi_archiver::config::{load_config_with_hash, Config};
use koradi_archiver::events::{event_channel, PipelineEvent, ProgressAggregator};
use koradi_archiver::output::{ConsoleOutput, MarkdownOutput, OutputHandler};
use koradi_archiver::{Language, Pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Koradi-Archiver: mirror every published talk archive, grouped by language
///
/// Crawls the download section of each language, finds the archives linked
/// from every author page, and downloads the ones not already present.
#[derive(Parser, Debug)]
#[command(name = "koradi-archiver")]
#[command(version)]
#[command(about = "Mirror Koradi talk archives by language", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to store the per-language folders in
    /// (defaults to the directory containing this executable)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also write a markdown summary of the run to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show what would be crawled and where files would go, then exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    let output_root = resolve_output_root(cli.output_dir.as_deref(), &config)?;
    let summary_path = cli.summary.clone().or_else(|| config.output.summary_path.clone());
    let languages = Language::defaults();

    if cli.dry_run {
        handle_dry_run(&config, &languages, &output_root, summary_path.as_deref());
        return Ok(());
    }

    handle_run(config, languages, output_root, summary_path, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("koradi_archiver=info,warn"),
            1 => EnvFilter::new("koradi_archiver=debug,info"),
            2 => EnvFilter::new("koradi_archiver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Picks the directory the language folders are created in
///
/// Command line wins over configuration; without either, files go next to
/// the executable.
fn resolve_output_root(cli_dir: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    if let Some(dir) = cli_dir.or(config.output.directory.as_deref()) {
        return Ok(dir.to_path_buf());
    }

    let executable = std::env::current_exe().context("Unable to detect executable location")?;
    let dir = executable
        .parent()
        .context("Executable location has no parent directory")?;
    Ok(dir.to_path_buf())
}

/// Handles the --dry-run mode: shows configuration and seeds
fn handle_dry_run(
    config: &Config,
    languages: &[Language],
    output_root: &Path,
    summary_path: Option<&Path>,
) {
    println!("=== Koradi-Archiver Dry Run ===\n");

    println!("HTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Page timeout: {}s", config.http.request_timeout_secs);
    println!("  Read timeout: {}s", config.http.read_timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", output_root.display());
    match summary_path {
        Some(path) => println!("  Summary: {}", path.display()),
        None => println!("  Summary: (terminal only)"),
    }
    println!("  Keep partial files: {}", config.output.keep_partial_files);

    println!("\nLanguages ({}):", languages.len());
    for language in languages {
        println!(
            "  - {} -> {} ({})",
            language.code,
            output_root.join(&language.code).display(),
            language.seed_url
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main archive run
async fn handle_run(
    config: Config,
    languages: Vec<Language>,
    output_root: PathBuf,
    summary_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output_root)
        .with_context(|| format!("Unable to create {}", output_root.display()))?;
    println!("Files will be downloaded to:  {}\n", output_root.display());

    let (events, receiver) = event_channel(config.events.channel_capacity);
    let pipeline = Pipeline::new(&config, languages.clone(), &output_root, events)?;

    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping downloads");
            cancel.cancel();
        }
    });

    let display = tokio::spawn(
        ProgressAggregator::new(&languages).run(receiver, move |view, event| {
            if quiet {
                return;
            }
            match event {
                PipelineEvent::Log(log) => println!("{}", log),
                PipelineEvent::Progress { index, .. } => {
                    if let Some(state) = view.progress_for(*index) {
                        if state.total > 0 && state.completed == state.total {
                            print!("{}", view.render_progress());
                        }
                    }
                }
                PipelineEvent::Summary(_) | PipelineEvent::Done => {}
            }
        }),
    );

    let report = pipeline.run().await;
    drop(pipeline);

    if let Err(e) = display.await {
        tracing::warn!("Progress display stopped early: {}", e);
    }

    ConsoleOutput.write_report(&report)?;

    if let Some(path) = summary_path {
        let markdown = MarkdownOutput::new(path);
        markdown.write_report(&report)?;
        tracing::info!("Summary written to {}", markdown.path().display());
    }

    Ok(())
}
