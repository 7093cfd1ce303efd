//! Student attendance lookup (attendance) - Main entry point
//!
//! Resolves a module's attendance dataset (local cache first, then the
//! primary and backup repositories) and prints one student's report.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use attendance_client::logging;
use attendance_client::report::render_report;
use attendance_client::{AcquisitionPipeline, AttendanceError, DatasetKey};
use attendance_common::catalog;
use attendance_common::config::{self, TomlConfig, ENV_CACHE_DIR};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Command-line arguments for attendance
#[derive(Parser, Debug)]
#[command(name = "attendance")]
#[command(about = "Look up per-student attendance records")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding cached datasets
    #[arg(long, env = ENV_CACHE_DIR)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the modules offered in an academic year
    Modules {
        #[arg(short, long)]
        year: String,
    },

    /// Show one student's attendance for a module
    Lookup {
        #[arg(short, long)]
        year: String,

        #[arg(short, long)]
        module: String,

        #[arg(short, long)]
        student: String,

        /// Ignore the local cache
        #[arg(long)]
        refresh: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a module's dataset into the local cache
    Fetch {
        #[arg(short, long)]
        year: String,

        #[arg(short, long)]
        module: String,

        /// Ignore the local cache
        #[arg(long)]
        refresh: bool,
    },

    /// Delete every cached attendance dataset
    ClearCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Subscriber first, so config loading is logged
    let log_handle = logging::init();
    let config = match logging::load_config(args.config.as_deref(), &log_handle) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<AttendanceError>() {
            Some(AttendanceError::StudentNotFound { student_id }) => {
                eprintln!("No attendance record for student {}", student_id);
                ExitCode::from(2)
            }
            Some(AttendanceError::Cancelled) => {
                eprintln!("Interrupted");
                ExitCode::from(130)
            }
            _ => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: Args, config: TomlConfig) -> Result<()> {
    match args.command {
        Command::Modules { year } => {
            let modules = catalog::modules_for(&year);
            if modules.is_empty() {
                anyhow::bail!("Unknown academic year: {}", year);
            }
            for descriptor in modules {
                println!("{:<40} {}", descriptor.id, descriptor.name);
            }
            Ok(())
        }
        Command::Lookup {
            year,
            module,
            student,
            refresh,
            json,
        } => {
            let descriptor = catalog::require(&year, &module)?;
            let key = DatasetKey::new(&year, &module)?;
            let pipeline = open_pipeline(args.cache_dir.as_deref(), &config)?;
            let cancel = cancel_on_interrupt();

            let report = pipeline
                .lookup_student(&key, &student, refresh, Some(&cancel))
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report, &key, descriptor.name));
            }
            Ok(())
        }
        Command::Fetch {
            year,
            module,
            refresh,
        } => {
            catalog::require(&year, &module)?;
            let key = DatasetKey::new(&year, &module)?;
            let pipeline = open_pipeline(args.cache_dir.as_deref(), &config)?;
            let cancel = cancel_on_interrupt();

            let records = pipeline.get_dataset(&key, refresh, Some(&cancel)).await?;
            println!("{}: {} records", key, records.len());
            Ok(())
        }
        Command::ClearCache => {
            let pipeline = open_pipeline(args.cache_dir.as_deref(), &config)?;
            let deleted = pipeline.clear_cache().await?;
            println!("Removed {} cached datasets", deleted);
            Ok(())
        }
    }
}

fn open_pipeline(cache_dir: Option<&Path>, config: &TomlConfig) -> Result<AcquisitionPipeline> {
    let cache_dir = config::resolve_cache_dir(cache_dir, config);
    info!(cache_dir = %cache_dir.display(), "Using cache folder");
    if !config.remote.has_token() {
        warn!("No access token configured, remote requests are unauthenticated");
    }

    AcquisitionPipeline::from_config(config, &cache_dir)
        .context("Failed to initialize acquisition pipeline")
}

/// Token cancelled on Ctrl+C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, cancelling");
            trigger.cancel();
        }
    });
    cancel
}
