//! ApiProvider - vehicle name → Vehicle API registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use contracts::{ContractError, Environment, Result, SimulationSettings};
use sensors::SensorFactory;
use tracing::{info, instrument, warn};

use crate::api::VehicleApi;
use crate::vehicles::build_vehicle;
use crate::{read, write};

#[derive(Default)]
struct Registry {
    vehicles: HashMap<String, Arc<dyn VehicleApi>>,
    /// Registration order; the first entry is the default vehicle
    order: Vec<String>,
}

/// A vehicle that failed to build, kept out of the registry.
#[derive(Debug)]
pub struct VehicleBuildError {
    pub vehicle: String,
    pub error: ContractError,
}

/// Vehicle registry
///
/// Owned by the session and shared with the transport. Lookups take a read
/// lock and clone the `Arc`, so no registry lock is held while a vehicle
/// operation runs.
#[derive(Default)]
pub struct ApiProvider {
    inner: RwLock<Registry>,
}

impl std::fmt::Debug for ApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiProvider")
            .field("vehicles", &self.names())
            .finish()
    }
}

impl ApiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every vehicle in `settings`.
    ///
    /// A vehicle whose sensors fail to build is reported and left out; the
    /// others are registered regardless.
    #[instrument(
        name = "api_provider_from_settings",
        skip_all,
        fields(vehicles = settings.vehicles.len())
    )]
    pub fn from_settings(
        settings: &SimulationSettings,
        factory: Arc<dyn SensorFactory>,
    ) -> (Self, Vec<VehicleBuildError>) {
        let provider = Self::new();
        let mut failures = Vec::new();

        for setting in &settings.vehicles {
            let environment = Environment::standard(settings.home_geo_point(setting));
            let built = build_vehicle(setting, factory.clone(), &environment)
                .and_then(|api| provider.insert(api));

            if let Err(error) = built {
                warn!(vehicle = %setting.name, error = %error, "vehicle skipped");
                failures.push(VehicleBuildError {
                    vehicle: setting.name.clone(),
                    error,
                });
            }
        }

        observability::record_vehicle_count(provider.len());
        info!(
            registered = provider.len(),
            failed = failures.len(),
            "vehicle registry built"
        );
        (provider, failures)
    }

    /// Register `api` under its own name.
    pub fn insert(&self, api: Arc<dyn VehicleApi>) -> Result<()> {
        let name = api.name().to_string();
        let mut registry = write(&self.inner);
        if registry.vehicles.contains_key(&name) {
            return Err(ContractError::duplicate_vehicle(name));
        }
        registry.order.push(name.clone());
        registry.vehicles.insert(name, api);
        Ok(())
    }

    /// Resolve a vehicle by name. An empty name means the default vehicle.
    pub fn get(&self, name: &str) -> Result<Arc<dyn VehicleApi>> {
        let registry = read(&self.inner);
        let key = if name.is_empty() {
            registry.order.first().map(String::as_str).unwrap_or_default()
        } else {
            name
        };
        registry
            .vehicles
            .get(key)
            .cloned()
            .ok_or_else(|| ContractError::vehicle_not_found(name))
    }

    pub fn default_vehicle_name(&self) -> Option<String> {
        read(&self.inner).order.first().cloned()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        read(&self.inner).order.clone()
    }

    /// Every vehicle in registration order
    pub fn all(&self) -> Vec<Arc<dyn VehicleApi>> {
        let registry = read(&self.inner);
        registry
            .order
            .iter()
            .filter_map(|name| registry.vehicles.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        read(&self.inner).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
