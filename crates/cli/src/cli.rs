//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use observability::LogFormat;
use std::path::PathBuf;

/// Vehicle Bridge - per-vehicle control and telemetry server
#[derive(Parser, Debug)]
#[command(
    name = "vehicle-bridge",
    author,
    version,
    about = "Per-vehicle control and telemetry bridge",
    long_about = "Serves a JSON-lines control/telemetry API for every vehicle in a\n\
                  simulation configuration, while a tick thread advances vehicle\n\
                  state and sensors."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        env = "VEHICLE_BRIDGE_VERBOSE"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (json, pretty, compact)
    #[arg(
        long,
        default_value = "pretty",
        global = true,
        env = "VEHICLE_BRIDGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every vehicle and serve the RPC API until interrupted
    Serve(ServeArgs),

    /// Validate configuration file without serving
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `serve` command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "bridge.toml",
        env = "VEHICLE_BRIDGE_CONFIG"
    )]
    pub config: PathBuf,

    /// Override RPC bind host from configuration
    #[arg(long, env = "VEHICLE_BRIDGE_HOST")]
    pub host: Option<String>,

    /// Override RPC port from configuration
    #[arg(long, env = "VEHICLE_BRIDGE_PORT")]
    pub port: Option<u16>,

    /// Override simulation tick rate (Hz) from configuration
    #[arg(long, env = "VEHICLE_BRIDGE_TICK_RATE")]
    pub tick_rate: Option<f64>,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "VEHICLE_BRIDGE_DURATION")]
    pub duration: u64,

    /// Validate configuration and exit without serving
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "VEHICLE_BRIDGE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "bridge.toml")]
    pub config: PathBuf,

    /// Also build every vehicle's sensors to catch unknown types and bad params
    #[arg(long)]
    pub build: bool,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "bridge.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed sensor information
    #[arg(long)]
    pub sensors: bool,
}
