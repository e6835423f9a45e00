//! `serve` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::SimulationSettings;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::session::Session;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut settings = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut settings, args);
    config_loader::ConfigLoader::validate(&settings)
        .context("Configuration invalid after command-line overrides")?;

    info!(
        vehicles = settings.vehicles.len(),
        bind = %settings.server.bind_address(),
        tick_rate_hz = settings.clock.tick_rate_hz,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration valid, exiting");
        print_config_summary(&settings);
        return Ok(());
    }

    if args.metrics_port > 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let session = Session::build(settings)?;
    info!(
        vehicles = ?session.provider().names(),
        skipped = session.failures().len(),
        "Session ready"
    );
    let duration = (args.duration > 0).then(|| Duration::from_secs(args.duration));

    let stats = session.run(wait_for_shutdown(duration)).await?;

    match stats.to_json() {
        Ok(json) => info!(summary = %json, "Session finished"),
        Err(e) => warn!(error = %e, "Failed to encode session summary"),
    }
    stats.print_summary();

    Ok(())
}

/// Apply CLI overrides to configuration
fn apply_overrides(settings: &mut SimulationSettings, args: &ServeArgs) {
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding RPC host");
        settings.server.host = host.clone();
    }

    if let Some(port) = args.port {
        info!(port = port, "Overriding RPC port");
        settings.server.port = port;
    }

    if let Some(rate) = args.tick_rate {
        info!(tick_rate_hz = rate, "Overriding tick rate");
        settings.clock.tick_rate_hz = rate;
    }
}

/// Resolve on Ctrl+C, SIGTERM or after `duration`.
async fn wait_for_shutdown(duration: Option<Duration>) {
    match duration {
        Some(duration) => {
            info!(seconds = duration.as_secs(), "Running for fixed duration");
            tokio::select! {
                _ = tokio::time::sleep(duration) => info!("Duration elapsed"),
                _ = shutdown_signal() => {}
            }
        }
        None => shutdown_signal().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => warn!("Received Ctrl+C, initiating graceful shutdown"),
            Err(e) => {
                warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                warn!("Received SIGTERM, initiating graceful shutdown");
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(settings: &SimulationSettings) {
    println!("\n=== Configuration Summary ===");
    println!("RPC server: {}", settings.server.bind_address());
    println!("Max request: {} bytes", settings.server.max_request_bytes);
    println!("Tick rate: {} Hz", settings.clock.tick_rate_hz);
    println!("\nVehicles ({}):", settings.vehicles.len());
    for vehicle in &settings.vehicles {
        println!(
            "  - {} ({}, {} sensors)",
            vehicle.name,
            vehicle.vehicle_type,
            vehicle.sensors.len()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn serve_args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["vehicle-bridge", "serve"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Serve(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_overrides_replace_settings() {
        let mut settings = SimulationSettings::default();
        let args = serve_args(&["--host", "0.0.0.0", "--port", "4100", "--tick-rate", "20"]);

        apply_overrides(&mut settings, &args);
        assert_eq!(settings.server.bind_address(), "0.0.0.0:4100");
        assert_eq!(settings.clock.tick_rate_hz, 20.0);
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let mut settings = SimulationSettings::default();
        let before = settings.server.bind_address();
        apply_overrides(&mut settings, &serve_args(&[]));
        assert_eq!(settings.server.bind_address(), before);
    }

    #[tokio::test]
    async fn test_dry_run_validates_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(
            &path,
            "[[vehicles]]\nname = \"rover\"\nvehicle_type = \"warthog\"\n",
        )
        .unwrap();
        let config = path.to_str().unwrap();

        let ok = serve_args(&["--config", config, "--dry-run"]);
        run_serve(&ok).await.unwrap();

        let bad = serve_args(&["--config", config, "--dry-run", "--tick-rate", "0"]);
        assert!(run_serve(&bad).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_config() {
        let args = serve_args(&["--config", "/nonexistent/bridge.toml"]);
        let err = run_serve(&args).await.unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }
}
