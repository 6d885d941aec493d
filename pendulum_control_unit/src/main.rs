//! # Pendulum Control Unit
//!
//! Runs the continuous 0° ↔ 90° cycling test against the simulated actuator
//! and writes per-tick telemetry to CSV.
//!
//! # Usage
//!
//! ```bash
//! # Stock run, real-time pacing, defaults for everything
//! pendulum_control_unit
//!
//! # Config file, short fast-forward run without the progress line
//! pendulum_control_unit --config pendulum.toml --max-cycles 5 --simulated-time --quiet
//!
//! # Verbose JSON diagnostics
//! pendulum_control_unit -v --json
//! ```
//!
//! Ctrl+C (SIGINT) or SIGTERM stops the loop after the current tick; the
//! axis is then commanded to the minimum angle and the summary is printed.

#![deny(warnings)]

use clap::Parser;
use pendulum_common::config::{ConfigError, ConfigLoader, LogLevel, PendulumConfig};
use pendulum_control_unit::clock::{Clock, SimulatedClock, SystemClock};
use pendulum_control_unit::{ControlError, CycleRunner, TelemetryLog};
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Pendulum Control Unit - simulated trapezoidal cycling test
#[derive(Parser, Debug)]
#[command(name = "pendulum_control_unit")]
#[command(version)]
#[command(about = "Simulated single-axis pendulum cycling test with CSV telemetry")]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Telemetry CSV path (overrides `logging.log_path`).
    #[arg(long, value_name = "FILE")]
    log_path: Option<PathBuf>,

    /// Stop after this many completed cycles (overrides `control.max_cycles`).
    #[arg(long, value_name = "N")]
    max_cycles: Option<u32>,

    /// Duration of one segment in seconds (overrides `motion.segment_duration`).
    #[arg(long, value_name = "SECS")]
    segment_duration: Option<f64>,

    /// Run on virtual time: no real sleeping, deterministic timestamps.
    #[arg(long)]
    simulated_time: bool,

    /// Suppress the in-place progress line.
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args);

    let base_level = loaded
        .as_ref()
        .map(|c| c.logging.log_level)
        .unwrap_or_default();
    setup_tracing(&args, base_level);

    info!("Pendulum Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(ControlError::from(e)) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));

    if let Err(e) = result {
        error!("FATAL: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }

    println!("Program terminated safely.");
    info!("Pendulum Control Unit shutdown complete");
}

/// Load the config file (or defaults), apply CLI overrides, validate.
fn load_config(args: &Args) -> Result<PendulumConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => PendulumConfig::load(path)?,
        None => PendulumConfig::default(),
    };

    if let Some(path) = &args.log_path {
        config.logging.log_path = path.clone();
    }
    if let Some(n) = args.max_cycles {
        config.control.max_cycles = n;
    }
    if let Some(secs) = args.segment_duration {
        config.motion.segment_duration = secs;
    }
    if args.quiet {
        config.logging.progress = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: PendulumConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The summary only needs running totals; rows live in the CSV.
    let telemetry = TelemetryLog::create(&config.logging.log_path)?.with_history(false);
    info!("Telemetry log: {}", config.logging.log_path.display());

    if args.simulated_time {
        info!("Simulated time enabled (no real-time pacing)");
        drive(config, SimulatedClock::new(), telemetry)
    } else {
        drive(config, SystemClock::new(), telemetry)
    }
}

fn drive<C: Clock>(
    config: PendulumConfig,
    clock: C,
    telemetry: TelemetryLog<File>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut runner = CycleRunner::new(config, clock, telemetry)?;

    let running = runner.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })
    .map_err(ControlError::from)?;

    let summary = runner.run()?;
    info!(
        "Run finished: {} cycles, {} data points",
        summary.cycles_completed, summary.data_points
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
///
/// Diagnostics go to stderr; stdout carries the console report.
fn setup_tracing(args: &Args, base: LogLevel) {
    let filter = build_filter(args.verbose, base, std::env::var("RUST_LOG").ok());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

/// `--verbose` forces DEBUG; otherwise a valid `RUST_LOG` wins over the
/// configured base level.
fn build_filter(verbose: bool, base: LogLevel, rust_log: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(Level::DEBUG.as_str());
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(Level::from(base).as_str()))
}
