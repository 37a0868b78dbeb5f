//! Review Metrics - review-completion counts for chat and feedback logs
//!
//! A CLI tool that fully scans the chat log and feedback log collections
//! and reports how many entries are reviewed and how many are pending.
//!
//! Exit codes:
//!   0 - Metrics computed (status 200)
//!   1 - Configuration or scan failure (status 500), or a local I/O error

mod analysis;
mod cli;
mod config;
mod error;
mod handler;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use error::MetricsError;
use report::Outcome;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config first, so the file's verbosity reaches the subscriber
    let loaded = Config::from_args(&args);
    let config_verbose = loaded.as_ref().map(|c| c.general.verbose).unwrap_or(false);
    init_logging(args.log_level(config_verbose));

    info!("Review Metrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, loaded).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .review-metrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your chat log and feedback tables.");
    Ok(())
}

/// Initialize logging at `level`.
///
/// Logs go to stderr so stdout carries only the response. `RUST_LOG`
/// overrides the level chosen by `--verbose`/`--quiet` and the config file.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run one metrics invocation and emit the response. Returns the exit code.
async fn run(args: Args, loaded: Result<Config, MetricsError>) -> Result<i32> {
    let start_time = Instant::now();

    let (outcome, include_percentages) = invoke(&args, loaded).await;

    let output = report::render(&outcome, args.format, include_percentages, Utc::now())?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write response to {}", path.display()))?;
            info!("Response saved to {}", path.display());
        }
        None => println!("{}", output),
    }

    let response = report::build_response(&outcome, include_percentages);
    info!(
        "Finished with status {} in {:.2}s",
        response.status_code,
        start_time.elapsed().as_secs_f64()
    );

    Ok(if response.is_success() { 0 } else { 1 })
}

/// Compute the outcome for a loaded configuration.
///
/// A configuration that failed to load becomes the outcome itself, so it is
/// reported through the same error response as any other failure.
async fn invoke(args: &Args, loaded: Result<Config, MetricsError>) -> (Outcome, bool) {
    match loaded {
        Ok(config) => {
            let outcome = handler::handle(&config).await;
            (outcome, config.report.include_percentages)
        }
        Err(e) => {
            error!("Configuration error: {}", e);
            (Err(e), args.percentages)
        }
    }
}
