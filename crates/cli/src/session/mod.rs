//! Session lifecycle: registry, tick thread and RPC server.

mod integrator;
mod stats;
mod ticker;

pub use stats::SessionStats;
use ticker::Ticker;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::SimulationSettings;
use rpc_server::{RpcServer, ServerConfig};
use sensors::DefaultSensorFactory;
use tracing::{info, instrument, warn};
use vehicle_api::{ApiProvider, VehicleBuildError};

use crate::error::CliError;

/// A built fleet, ready to serve
pub struct Session {
    settings: SimulationSettings,
    provider: Arc<ApiProvider>,
    failures: Vec<VehicleBuildError>,
}

impl Session {
    /// Build every configured vehicle with the built-in sensor types.
    ///
    /// Vehicles that fail are skipped and reported; the session only fails
    /// when none could be built.
    #[instrument(
        name = "session_build",
        skip_all,
        fields(vehicles = settings.vehicles.len())
    )]
    pub fn build(settings: SimulationSettings) -> Result<Self, CliError> {
        let factory = Arc::new(DefaultSensorFactory::with_builtin());
        let (provider, failures) = ApiProvider::from_settings(&settings, factory);

        for failure in &failures {
            warn!(vehicle = %failure.vehicle, error = %failure.error, "vehicle not available");
        }
        if provider.is_empty() {
            return Err(CliError::NoVehicles {
                failed: failures.len(),
            });
        }

        Ok(Self {
            settings,
            provider: Arc::new(provider),
            failures,
        })
    }

    pub fn provider(&self) -> &Arc<ApiProvider> {
        &self.provider
    }

    pub fn failures(&self) -> &[VehicleBuildError] {
        &self.failures
    }

    /// Serve until `shutdown` resolves, then stop the server and the tick
    /// thread in that order.
    #[instrument(name = "session_run", skip_all, fields(vehicles = self.provider.len()))]
    pub async fn run<F>(self, shutdown: F) -> Result<SessionStats>
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let config = ServerConfig::from(&self.settings.server);
        let address = config.bind_address.clone();

        let server = RpcServer::bind(config, Arc::clone(&self.provider))
            .await
            .map_err(|e| CliError::server_start(&address, e.to_string()))?;
        let server = server
            .spawn()
            .map_err(|e| CliError::server_start(&address, e.to_string()))?;

        let ticker = Ticker::spawn(Arc::clone(&self.provider), self.settings.clock.tick_rate_hz)
            .context("Failed to start tick thread")?;

        info!(
            addr = %server.local_addr(),
            tick_rate_hz = self.settings.clock.tick_rate_hz,
            "Session running"
        );

        shutdown.await;

        info!("Shutting down session");
        let server_metrics = server.metrics();
        server.shutdown().await;
        let tick_metrics = ticker.stop();

        Ok(SessionStats {
            duration: start.elapsed(),
            vehicles: self.provider.len(),
            failed_vehicles: self.failures.len(),
            server: server_metrics,
            ticks: tick_metrics.summary(),
        })
    }
}
