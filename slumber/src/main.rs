//! # Slumber Binary
//!
//! Runs the bed monitor until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run against the simulated bed with the default config
//! slumber
//!
//! # Custom config, verbose JSON logs
//! slumber --config ./slumber.toml -v --json
//!
//! # Simulate a cover without tap sensors (slow polling, no gestures)
//! slumber --cover-version "Pod 3"
//! ```

use clap::Parser;
use slumber::drivers::simulation::SimulatedPod;
use slumber::{FileAlarmStore, JsonSettingsStore, Monitor, SharedStatus};
use slumber_common::config::{ConfigError, ConfigLoader, LogLevel, SlumberConfig};
use slumber_common::consts::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Slumber - smart-bed runtime supervisor
#[derive(Parser, Debug)]
#[command(name = "slumber")]
#[command(version)]
#[command(about = "Polls the bed, detects tap gestures and runs their actions")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file (slumber.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Cover version reported by the simulated bed
    #[arg(long, default_value = "Pod 4")]
    cover_version: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Slumber startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (config, missing) = match SlumberConfig::load(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound) => (SlumberConfig::default(), true),
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            return Err(e.into());
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!("Slumber v{} starting...", env!("CARGO_PKG_VERSION"));
    if missing {
        warn!("No config at {:?}, using defaults", args.config);
    }
    config.validate()?;

    let pod = Arc::new(SimulatedPod::new(&args.cover_version));
    let settings = Arc::new(JsonSettingsStore::new(&config.paths.settings));
    let alarms = Arc::new(FileAlarmStore::new(&config.paths.alarm_blob));
    let status = Arc::new(SharedStatus::persisted(&config.paths.status));

    info!(
        "Service {:?}: settings {:?}, alarms {:?}, status {:?}",
        config.shared.service_name,
        config.paths.settings,
        config.paths.alarm_blob,
        config.paths.status
    );

    let monitor = Monitor::new(
        &config,
        Arc::clone(&pod),
        settings,
        pod,
        alarms,
        status,
    );
    let Some(handle) = monitor.start() else {
        return Err("monitor already running".into());
    };

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Unable to listen for shutdown signal: {}", e),
    }

    monitor.stop();
    if let Err(e) = handle.await {
        warn!("Monitor task ended abnormally: {}", e);
    }

    info!("Slumber shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_filter()
    } else {
        level.as_filter()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
