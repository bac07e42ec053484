//! Command-line interface for trailer-sync.
//!
//! Provides commands for running the trailer task once, running it on its
//! daily schedule, and inspecting the task identity and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{self, ResolvedConfig};
use crate::core::{run_daily, DailySchedule, GenerateTrailersTask};
use crate::domain::{RunOutcome, TaskInfo, TaskTrigger};
use crate::library::ManifestLibrary;
use crate::trailers::{ProgressSink, TrailerConfig};

/// trailer-sync - Materialize provider trailers as strm files
#[derive(Parser, Debug)]
#[command(name = "trailer-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate trailers once and exit
    Run {
        /// Library manifest (overrides the configured one)
        #[arg(short, long, env = "TRAILER_SYNC_MANIFEST")]
        manifest: Option<PathBuf>,

        /// Run even if trailers are disabled in the configuration
        #[arg(long)]
        force: bool,
    },

    /// Generate trailers every day at the configured time
    Daemon {
        /// Library manifest (overrides the configured one)
        #[arg(short, long, env = "TRAILER_SYNC_MANIFEST")]
        manifest: Option<PathBuf>,

        /// Run even if trailers are disabled in the configuration
        #[arg(long)]
        force: bool,
    },

    /// Show the scheduled task identity and triggers
    Task,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run { manifest, force } => run_once(manifest, force).await,
            Commands::Daemon { manifest, force } => run_daemon(manifest, force).await,
            Commands::Task => show_task().await,
            Commands::Config => show_config().await,
        }
    }
}

/// Progress sink that logs whole-percent steps
struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, percent: f64) {
        debug!("Progress: {:.0}%", percent);
    }
}

/// Trailer settings for a run, honoring --force
fn trailer_config(resolved: &ResolvedConfig, force: bool) -> TrailerConfig {
    let mut trailers = resolved.trailers.clone();
    if force {
        trailers.enable_trailers = true;
    }
    trailers
}

/// Manifest from the command line or the configuration
fn manifest_path(resolved: &ResolvedConfig, manifest: Option<PathBuf>) -> Result<PathBuf> {
    manifest.or_else(|| resolved.manifest.clone()).context(
        "No library manifest. Use --manifest <file>, TRAILER_SYNC_MANIFEST, or trailers.manifest in .trailer-sync/config.yaml",
    )
}

/// Cancellation token tripped by Ctrl-C
fn ctrl_c_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current item...");
            trigger.cancel();
        }
    });
    cancel
}

/// Run the task once
async fn run_once(manifest: Option<PathBuf>, force: bool) -> Result<()> {
    let resolved = config::config()?;
    let manifest = manifest_path(resolved, manifest)?;

    let library = Arc::new(ManifestLibrary::new(&manifest));
    let task = GenerateTrailersTask::new(library, trailer_config(resolved, force));

    println!("🎬 Generating trailers from {}", manifest.display());

    let outcome = task.execute(Arc::new(LogProgress), ctrl_c_token()).await?;
    print_outcome(&outcome);

    if let Some(report) = outcome.report() {
        if report.failed > 0 {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Run the task on its daily trigger until Ctrl-C
async fn run_daemon(manifest: Option<PathBuf>, force: bool) -> Result<()> {
    let resolved = config::config()?;
    let manifest = manifest_path(resolved, manifest)?;
    let schedule = DailySchedule::from(resolved.trigger);

    println!(
        "⏰ Generating trailers daily at {} from {}",
        schedule.time_of_day().format("%H:%M"),
        manifest.display()
    );

    let library = Arc::new(ManifestLibrary::new(&manifest));
    let cancel = ctrl_c_token();

    run_daily(schedule, cancel.clone(), || {
        let library = Arc::clone(&library);
        let cancel = cancel.clone();
        async move {
            // The flag is checked once per run, so pick up config edits here.
            let trailers = config::reload_config()
                .map(|c| trailer_config(&c, force))
                .context("Failed to reload configuration")?;
            GenerateTrailersTask::new(library, trailers)
                .execute(Arc::new(LogProgress), cancel)
                .await
        }
    })
    .await;

    Ok(())
}

/// Show the task identity
async fn show_task() -> Result<()> {
    let resolved = config::config()?;
    let info = TaskInfo::generate_trailers(&resolved.trailers.provider_name);

    println!("Key:         {}", info.key);
    println!("Name:        {}", info.name);
    println!("Description: {}", info.description);
    println!("Category:    {}", info.category);
    let TaskTrigger::Daily { time_of_day } = resolved.trigger;
    println!("Trigger:     daily at {}", time_of_day.format("%H:%M"));

    Ok(())
}

/// Show resolved configuration
async fn show_config() -> Result<()> {
    let resolved = config::config()?;

    println!("trailer-sync configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    match &resolved.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Enabled:     {}", resolved.trailers.enable_trailers);
    println!("Provider:    {}", resolved.trailers.provider_name);
    match &resolved.manifest {
        Some(path) => println!("Manifest:    {}", path.display()),
        None => println!("Manifest:    (not set)"),
    }
    let TaskTrigger::Daily { time_of_day } = resolved.trigger;
    println!("Schedule:    daily at {}", time_of_day.format("%H:%M"));

    Ok(())
}

/// Print a run summary
fn print_outcome(outcome: &RunOutcome) {
    let report = match outcome {
        RunOutcome::Disabled => {
            println!("Trailers are disabled. Enable trailers.enabled or pass --force.");
            return;
        }
        RunOutcome::Completed(report) => {
            println!();
            println!("✅ Trailer generation finished");
            report
        }
        RunOutcome::Cancelled(report) => {
            println!();
            println!(
                "⚠️  Cancelled after {} of {} item(s)",
                report.processed, report.total
            );
            report
        }
    };

    println!("  Items:            {}", report.total);
    println!("  Written:          {}", report.written);
    println!("  Up to date:       {}", report.up_to_date);
    println!("  Ignored:          {}", report.ignored);
    println!("  Without trailer:  {}", report.no_trailer);
    println!("  Files pruned:     {}", report.pruned_files);
    println!("  Folders removed:  {}", report.removed_folders);
    if report.failed > 0 {
        println!("  Failed:           {}", report.failed);
    }
}
